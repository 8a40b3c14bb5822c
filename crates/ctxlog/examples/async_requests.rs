// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Request correlation across async tasks
//!
//! Each simulated request runs inside its own context scope, so both the
//! facade calls and plain `tracing` events carry its request id.
//!
//! Run with: DEBUG=true cargo run --example async_requests

use ctxlog::Context;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ctxlog::init()?;
    ctxlog::init_tracing_bridge()?;

    let startup = ctxlog::snapshot();
    startup.info().field("workers", 2).msg("Starting request handlers");

    let handle1 = tokio::spawn(handle_request(Context::new().with_request_id("req-001"), 3));
    let handle2 = tokio::spawn(handle_request(Context::new().with_request_id("req-002"), 2));

    let (first, second) = tokio::join!(handle1, handle2);
    first?;
    second?;

    tracing::info!("All requests complete");

    Ok(())
}

async fn handle_request(ctx: Context, items: usize) {
    let scope = ctx.clone();
    scope
        .scope(async move {
            ctxlog::info(&ctx).field("items", items).msg("Request received");

            for index in 0..items {
                tracing::debug!(index, "Processing item");
                tokio::time::sleep(Duration::from_millis(10)).await;
            }

            ctxlog::info(&ctx).msg("Request finished");
        })
        .await
}
