#![forbid(unsafe_code)]

//! Setup-time errors of the browser host.
//!
//! Runtime paths never fail: a missing element or attribute turns the
//! affected feature into a no-op. Only wiring the page up can fail, and the
//! entry point logs the error and leaves the page static.

use cardui_core::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("no global `window`")]
    MissingWindow,
    #[error("window has no `document`")]
    MissingDocument,
    #[error("document has no `<body>`")]
    MissingBody,
    #[error("a card page is already mounted on this document")]
    AlreadyMounted,
    #[error("page config: {0}")]
    Config(#[from] ConfigError),
    #[error("javascript exception: {0}")]
    Js(String),
}

#[cfg(test)]
mod tests {
    use super::HostError;
    use cardui_core::PageConfig;

    #[test]
    fn config_errors_convert() {
        let err = PageConfig::from_json_str("{ nope").map_err(HostError::from);
        let msg = err.expect_err("malformed json").to_string();
        assert!(msg.starts_with("page config: invalid config JSON"), "{msg}");
    }
}
