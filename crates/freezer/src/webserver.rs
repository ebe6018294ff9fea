//! HTTP listener

use std::net::SocketAddr;

use axum::Router;

use crate::prelude::*;

pub async fn serve(app: App, router: Router) -> ClResult<()> {
	let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
		error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
		e
	})?;
	info!("Listening on HTTP {}", &app.opts.listen);

	axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	info!("Server stopped");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Cannot install shutdown handler: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutdown requested");
}

// vim: ts=4
