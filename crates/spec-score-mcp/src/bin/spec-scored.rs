use std::io;

use spec_score_mcp::McpServer;

fn main() -> io::Result<()> {
    let mode = std::env::var("SPEC_SCORED_TRANSPORT").unwrap_or_else(|_| "stdio".to_string());
    let server = McpServer::new();
    match mode.as_str() {
        "stdio" => server.serve_stdio(),
        "http" => {
            let addr = std::env::var("SPEC_SCORE_HTTP_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8790".to_string());
            server.serve_http(&addr)
        }
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "SPEC_SCORED_TRANSPORT must be stdio or http",
        )),
    }
}
