/// Holds the configuration for a SPARQL Analytics web server.
pub struct ServerConfig {
    /// The IP address or DNS name that the socket binds to.
    pub bind: String,
    /// Whether CORS is enabled.
    pub cors: bool,
    /// Rows per page in the table view.
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "localhost:7878".to_owned(),
            cors: false,
            page_size: 25,
        }
    }
}
