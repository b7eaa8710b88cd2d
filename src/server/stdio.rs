use std::io;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use super::handler::ToolHandler;
use super::protocol::{RpcRequest, RpcResponse, codes};
use crate::clipboard::SideChannel;
use crate::target::TargetApp;

/// Reads newline-delimited JSON-RPC messages until EOF, answering each in turn.
///
/// Messages are handled strictly one at a time; a long ask blocks the next line.
pub async fn serve<R, W, T, C>(
    reader: R,
    mut writer: W,
    handler: &ToolHandler<T, C>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    T: TargetApp,
    C: SideChannel,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => handler.handle(&request).await,
            Err(e) => {
                warn!(error = %e, "malformed message");
                Some(RpcResponse::err(
                    Value::Null,
                    codes::PARSE_ERROR,
                    format!("parse error: {}", e),
                ))
            }
        };

        if let Some(response) = response {
            write_message(&mut writer, &response).await?;
        }
    }

    info!("input closed, shutting down");
    Ok(())
}

/// Serves on the process's stdin and stdout.
pub async fn serve_stdio<T, C>(handler: &ToolHandler<T, C>) -> io::Result<()>
where
    T: TargetApp,
    C: SideChannel,
{
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(stdin, stdout, handler).await
}

async fn write_message<W>(writer: &mut W, response: &RpcResponse) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json.push('\n');

    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}
