use std::io;

use spec_score_mcp::McpServer;

fn main() -> io::Result<()> {
    McpServer::new().serve_stdio()
}
