/*!
Command-side modules: the per-invocation pipeline.

  synth    - tool descriptor -> SynthesizedCommand -> clap realization
  coerce   - parsed flags -> outgoing JSON arguments
  dispatch - sync/async bridge, one session per call, failure classification
  render   - ordered emission of result content

Each stage is pure or nearly so; only `dispatch` touches the network, and it
does that through the session gateway in `crate::mcp`.
*/

pub mod coerce;
pub mod dispatch;
pub mod render;
pub mod synth;
