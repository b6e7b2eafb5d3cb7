/// In-page helper injected by the engine before every page request.
/// It installs `window.__webship` once per document and is a no-op afterwards.
pub const SNAPSHOT_JS: &str = include_str!("snapshot.js");

/// Entry point appended after [`SNAPSHOT_JS`]; the request travels as `arguments[0]`.
pub const PROCESS_CALL: &str = "return window.__webship.process(arguments[0]);";
