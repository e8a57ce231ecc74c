/*
 * Path Tracer
 *
 * Walks a signal path from an origin set of endpoint terminations across
 * cables and front/rear pass-through ports.
 *
 * Architecture:
 * - Domain: TracedPath, PathError
 * - Infrastructure: PathTracer (pure, generic over TerminationGraph)
 *
 * Position stack:
 * - entering a multi-position rear port pushes the front positions taken
 * - leaving the far rear port pops them to pick the matching front ports
 * - an empty stack at a multi-position rear port halts the trace as split
 */

pub mod domain;
pub mod infrastructure;

pub use domain::{PathError, PathResult, TracedPath, DEFAULT_MAX_HOPS};
pub use infrastructure::PathTracer;
