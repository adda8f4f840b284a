use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;

/// Returns the lowercased extension of a path, without the dot.
///
/// Examples:
/// - `"data/Synonyms.CSV"` → `Some("csv")`
/// - `"data/synonyms"` → `None`
pub(crate) fn extension<P: AsRef<Path>>(path: P) -> Option<String> {
	path.as_ref()
		.extension()
		.map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Serializes `value` as 4-space indented JSON into `path`.
///
/// - Non-ASCII characters are written as-is (UTF-8)
/// - The content goes to a temporary file in the same directory first and is
///   then renamed over `path`, so readers never see a half-written file
pub(crate) fn write_pretty_json<P, T>(path: P, value: &T) -> io::Result<()>
where
	P: AsRef<Path>,
	T: Serialize + ?Sized,
{
	let path = path.as_ref();
	let parent = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	fs::create_dir_all(parent)?;

	let temp_file = NamedTempFile::new_in(parent)?;
	{
		let mut writer = BufWriter::new(temp_file.as_file());
		let mut serializer = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
		value.serialize(&mut serializer).map_err(io::Error::other)?;
		writer.write_all(b"\n")?;
		writer.flush()?;
	}

	temp_file.persist(path).map_err(|e| e.error)?;
	Ok(())
}

/// Lists all files in a directory whose extension is one of `extensions`.
///
/// - Only files directly contained in the directory are returned
/// - Extension matching is case-insensitive
/// - Paths are sorted so callers process them in a stable order
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() {
			if let Some(ext) = extension(&path) {
				if extensions.contains(&ext.as_str()) {
					files.push(path);
				}
			}
		}
	}

	files.sort();
	Ok(files)
}
