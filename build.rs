fn git_describe() -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["describe", "--always", "--tags", "--long", "--dirty"])
        .output()
        .ok()?;
    let info = std::str::from_utf8(&output.stdout).ok()?.trim();
    (!info.is_empty()).then(|| info.to_string())
}

fn watch_git_refs() {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .output()
        .ok();
    let git_dir = output.as_ref().and_then(|output| {
        std::str::from_utf8(&output.stdout)
            .ok()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
    });

    if let Some(git_dir) = git_dir {
        let git_path = std::path::Path::new(git_dir);
        for candidate in ["HEAD", "packed-refs", "refs/heads", "refs/tags"] {
            if git_path.join(candidate).exists() {
                println!("cargo:rerun-if-changed={git_dir}/{candidate}");
            }
        }
    }
}

fn main() {
    watch_git_refs();

    if let Some(info) = git_describe() {
        println!("cargo:rustc-env=_GIT_INFO={info}");
    }
}
