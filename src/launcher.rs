use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaunchKind {
    /// `.py`, run through the Python interpreter.
    PythonScript,
    /// `.bat` / `.cmd`, run in a new console via the command shell.
    BatchScript,
    /// `.lnk`, resolved by the platform open mechanism.
    Shortcut,
    /// `.exe` or a bare command without extension, run through the shell.
    Executable,
    /// Everything else is opened with the default application.
    Other,
}

fn classify(path: &str) -> LaunchKind {
    let ext = Path::new(path).extension().map(|e| e.to_ascii_lowercase());
    match ext.as_deref().and_then(|e| e.to_str()) {
        Some("py") => LaunchKind::PythonScript,
        Some("bat") | Some("cmd") => LaunchKind::BatchScript,
        Some("lnk") => LaunchKind::Shortcut,
        Some("exe") => LaunchKind::Executable,
        None => LaunchKind::Executable,
        _ => LaunchKind::Other,
    }
}

/// Pre-flight check used before attempting a launch.
///
/// A path without any directory separator is a bare command and is accepted
/// as-is; it resolves through the search path at spawn time. Anything else
/// must exist right now. Advisory only: the filesystem can change between
/// this check and the spawn.
pub fn validate_path(path: &str) -> (bool, String) {
    if path.is_empty() {
        return (false, "path is empty".to_string());
    }
    if !path.contains('/') && !path.contains('\\') {
        return (true, String::new());
    }
    if !Path::new(path).exists() {
        return (false, format!("file not found: {path}"));
    }
    (true, String::new())
}

/// Launch `path` with a strategy picked from its extension, fire and forget.
///
/// `Ok` means the operating system accepted the spawn request, not that the
/// program is running correctly; no handle is kept and nothing waits for the
/// child to exit.
pub fn launch(path: &str, workdir: Option<&str>) -> anyhow::Result<()> {
    let workdir = resolve_workdir(path, workdir);
    tracing::debug!(path, workdir = %workdir.display(), "launching");
    match classify(path) {
        LaunchKind::PythonScript => spawn_python(path, &workdir),
        LaunchKind::BatchScript => spawn_batch(path, &workdir),
        LaunchKind::Executable => spawn_shell(path, &workdir),
        LaunchKind::Shortcut | LaunchKind::Other => open_with_default(path),
    }
}

/// Pick the working directory for a launch: an explicit non-empty request
/// wins, else the containing directory of an existing file target, else the
/// process current directory.
fn resolve_workdir(path: &str, workdir: Option<&str>) -> PathBuf {
    if let Some(dir) = workdir {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let target = Path::new(path);
    if target.is_file() {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                return parent.to_path_buf();
            }
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(target_os = "windows")]
fn spawn_python(path: &str, workdir: &Path) -> anyhow::Result<()> {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
    Command::new("python")
        .arg(path)
        .current_dir(workdir)
        .creation_flags(CREATE_NEW_CONSOLE)
        .spawn()?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn spawn_python(path: &str, workdir: &Path) -> anyhow::Result<()> {
    Command::new("python3")
        .arg(path)
        .current_dir(workdir)
        .spawn()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn spawn_batch(path: &str, workdir: &Path) -> anyhow::Result<()> {
    use std::os::windows::process::CommandExt;
    let script = Path::new(path);
    let title = script
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let script_path = script.to_string_lossy().replace('/', "\\");
    // The whole `start` invocation goes through as a single raw argument so
    // the script path is embedded verbatim and never re-quoted by Command.
    let mut command = Command::new("cmd");
    command.raw_arg(format!(
        "/C start \"{title}\" /max cmd.exe /k \"{script_path}\""
    ));
    command.current_dir(workdir).spawn()?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn spawn_batch(path: &str, workdir: &Path) -> anyhow::Result<()> {
    Command::new("sh").arg(path).current_dir(workdir).spawn()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn spawn_shell(path: &str, workdir: &Path) -> anyhow::Result<()> {
    use std::os::windows::process::CommandExt;
    let mut command = Command::new("cmd");
    command.arg("/C");
    // Literal command line; bare commands resolve through the search path.
    command.raw_arg(path);
    command.current_dir(workdir).spawn()?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn spawn_shell(path: &str, workdir: &Path) -> anyhow::Result<()> {
    Command::new("sh")
        .arg("-c")
        .arg(path)
        .current_dir(workdir)
        .spawn()?;
    Ok(())
}

fn open_with_default(path: &str) -> anyhow::Result<()> {
    open::that_detached(path)?;
    Ok(())
}
