//! Chromium-family executable discovery.

use std::path::{Path, PathBuf};

/// Resolves the browser binary: an explicit path wins, otherwise the first
/// installed candidate for this platform.
pub(crate) fn find_browser(explicit: Option<&Path>) -> Option<PathBuf> {
	if let Some(path) = explicit {
		return resolve_candidate(&path.to_string_lossy());
	}
	platform_candidates().iter().find_map(|candidate| resolve_candidate(candidate))
}

fn resolve_candidate(candidate: &str) -> Option<PathBuf> {
	if candidate.starts_with('/') || candidate.contains('\\') || candidate.contains(':') {
		let path = PathBuf::from(candidate);
		path.exists().then_some(path)
	} else {
		which::which(candidate).ok()
	}
}

fn platform_candidates() -> Vec<String> {
	if cfg!(target_os = "macos") {
		[
			"/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
			"/Applications/Chromium.app/Contents/MacOS/Chromium",
			"/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
		]
		.into_iter()
		.map(str::to_string)
		.collect()
	} else if cfg!(target_os = "windows") {
		windows_candidates()
	} else {
		[
			"chromium",
			"chromium-browser",
			"google-chrome-stable",
			"google-chrome",
			"brave-browser",
			"/usr/bin/chromium",
			"/usr/bin/chromium-browser",
			"/usr/bin/google-chrome-stable",
			"/snap/bin/chromium",
		]
		.into_iter()
		.map(str::to_string)
		.collect()
	}
}

fn windows_candidates() -> Vec<String> {
	let mut roots: Vec<PathBuf> = ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
		.into_iter()
		.filter_map(|key| std::env::var(key).ok().map(PathBuf::from))
		.collect();
	if roots.is_empty() {
		roots.push(PathBuf::from(r"C:\Program Files"));
	}

	let suffixes: &[&[&str]] = &[
		&["Google", "Chrome", "Application", "chrome.exe"],
		&["Microsoft", "Edge", "Application", "msedge.exe"],
		&["Chromium", "Application", "chrome.exe"],
	];

	let mut candidates = Vec::new();
	for root in roots {
		for suffix in suffixes {
			let path = suffix.iter().fold(root.clone(), |acc, part| acc.join(part));
			candidates.push(path.to_string_lossy().to_string());
		}
	}
	candidates.extend(["chrome.exe", "msedge.exe", "chromium.exe"].map(str::to_string));
	candidates
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn windows_candidates_include_edge_and_chrome() {
		let candidates = windows_candidates();
		assert!(candidates.iter().any(|c| c.ends_with("msedge.exe")));
		assert!(candidates.iter().any(|c| c.ends_with("chrome.exe")));
	}

	#[test]
	fn explicit_missing_path_is_not_resolved() {
		assert_eq!(find_browser(Some(Path::new("/definitely/not/a/browser"))), None);
	}
}
