//! Command lines run inside the NFS server container.

/// Options every managed export is published with.
pub const EXPORT_OPTIONS: &str = "*(rw,sync,fsid=0,no_subtree_check)";

/// `<mountPath>\t*(rw,sync,fsid=0,no_subtree_check)`
pub fn export_line(mount_path: &str) -> String {
    format!("{}\t{EXPORT_OPTIONS}", normalize_path(mount_path))
}

/// The path as `mount` prints it: repeated `/` collapsed and no trailing `/`.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Single-quote `s` for `sh`.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Escape `s` so it matches literally inside a POSIX extended regex.
fn ere_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '.' | '[' | ']' | '{' | '}' | '(' | ')' | '\\' | '*' | '+' | '?' | '^' | '$' | '|'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Matches the export line of `mount_path` and nothing that merely starts with it.
fn export_line_pattern(mount_path: &str) -> String {
    format!("^{}[[:space:]]", ere_escape(&normalize_path(mount_path)))
}

fn sh(script: String) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script]
}

pub fn mkdir(path: &str) -> Vec<String> {
    vec!["mkdir".to_string(), "-p".to_string(), normalize_path(path)]
}

/// Lists the mount table entry whose mount point is exactly `path`.
pub fn find_mount(path: &str) -> Vec<String> {
    sh(format!(
        "mount | grep -F -- {}",
        shell_quote(&format!(" on {} type ", normalize_path(path)))
    ))
}

pub fn mount_bind(source: &str, target: &str) -> Vec<String> {
    vec![
        "mount".to_string(),
        "-o".to_string(),
        "bind".to_string(),
        source.to_string(),
        normalize_path(target),
    ]
}

pub fn umount(path: &str) -> Vec<String> {
    vec!["umount".to_string(), normalize_path(path)]
}

pub fn find_export(path: &str, exports_file: &str) -> Vec<String> {
    sh(format!(
        "grep -E -- {} {}",
        shell_quote(&export_line_pattern(path)),
        shell_quote(exports_file)
    ))
}

pub fn add_export(path: &str, exports_file: &str) -> Vec<String> {
    sh(format!(
        "printf '%s\\n' {} >> {}",
        shell_quote(&export_line(path)),
        shell_quote(exports_file)
    ))
}

pub fn del_export(path: &str, exports_file: &str) -> Vec<String> {
    let pattern = export_line_pattern(path).replace('/', r"\/");
    sh(format!(
        "sed -E -i {} {}",
        shell_quote(&format!("/{pattern}/d")),
        shell_quote(exports_file)
    ))
}

pub fn refresh_exports() -> Vec<String> {
    vec!["exportfs".to_string(), "-r".to_string()]
}
