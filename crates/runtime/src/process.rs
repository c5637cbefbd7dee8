//! Port helpers for the debugging endpoint.

/// Returns `true` when `port` can be bound on localhost.
pub fn port_available(port: u16) -> bool {
	std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Asks the OS for an unused localhost port.
///
/// The listener is dropped before returning, so another process can grab the
/// port first. The browser then fails to bind and the launch reports a
/// `DriverError::Launch`.
pub fn free_port() -> std::io::Result<u16> {
	let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
	Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bound_port_is_reported_unavailable() {
		let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
		let port = listener.local_addr().unwrap().port();
		assert!(!port_available(port));
		drop(listener);
		assert!(port_available(port));
	}

	#[test]
	fn free_port_is_bindable() {
		let port = free_port().unwrap();
		assert_ne!(port, 0);
		assert!(port_available(port));
	}
}
