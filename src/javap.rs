use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Turns one compiled class into human-readable text.
pub trait Disassembler {
    fn disassemble(&self, classpath: &Path, class_name: &str, extra_args: &[String])
    -> Result<Vec<u8>>;
}

/// Rewrites a dex container as a jar at `output`.
pub trait Converter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

fn tool_command(tool: &Path) -> Command {
    #[cfg(windows)]
    {
        let lower = tool.to_string_lossy().to_ascii_lowercase();
        if lower.ends_with(".cmd") || lower.ends_with(".bat") {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(tool);
            return cmd;
        }
    }

    Command::new(tool)
}

fn run_tool<I, S>(tool: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = tool_command(tool);
    cmd.args(args);
    debug!(command = ?cmd, "running external tool");
    cmd.output()
        .with_context(|| format!("failed to execute {}", tool.display()))
}

#[derive(Debug, Clone)]
pub struct Javap {
    bin: PathBuf,
}

impl Javap {
    pub fn new(bin: PathBuf) -> Self {
        Self { bin }
    }
}

impl Disassembler for Javap {
    fn disassemble(
        &self,
        classpath: &Path,
        class_name: &str,
        extra_args: &[String],
    ) -> Result<Vec<u8>> {
        let mut args: Vec<&OsStr> = vec![OsStr::new("-classpath"), classpath.as_os_str()];
        args.extend(extra_args.iter().map(OsStr::new));
        args.push(OsStr::new(class_name));

        let output = run_tool(&self.bin, args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "javap failed for {class_name} ({}): {}",
                output.status,
                stderr.trim()
            );
        }

        Ok(output.stdout)
    }
}

#[derive(Debug, Clone)]
pub struct Dex2Jar {
    bin: PathBuf,
}

impl Dex2Jar {
    pub fn new(bin: PathBuf) -> Self {
        Self { bin }
    }
}

impl Converter for Dex2Jar {
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let result = run_tool(
            &self.bin,
            [OsStr::new("-o"), output.as_os_str(), input.as_os_str()],
        )?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!("dex2jar failed ({}): {}", result.status, stderr.trim());
        }
        if !output.is_file() {
            bail!("dex2jar did not produce {}", output.display());
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    fn write_script(path: &Path, content: &str) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, content)?;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
        Ok(())
    }

    #[test]
    fn javap_passes_classpath_extras_then_class_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fake = dir.path().join("javap");
        write_script(
            &fake,
            r#"#!/bin/sh
echo "$@"
"#,
        )?;

        let javap = Javap::new(fake);
        let out = javap.disassemble(
            Path::new("/tmp/demo.jar"),
            "org.example.Demo",
            &["-p".to_string(), "-constants".to_string()],
        )?;
        assert_eq!(
            String::from_utf8(out)?,
            "-classpath /tmp/demo.jar -p -constants org.example.Demo\n"
        );
        Ok(())
    }

    #[test]
    fn javap_non_zero_exit_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fake = dir.path().join("javap");
        write_script(
            &fake,
            r#"#!/bin/sh
echo "class not found: $4" >&2
exit 1
"#,
        )?;

        let err = Javap::new(fake)
            .disassemble(Path::new("demo.jar"), "Missing", &[])
            .unwrap_err()
            .to_string();
        assert!(err.contains("javap failed for Missing"));
        assert!(err.contains("class not found"));
        Ok(())
    }

    #[test]
    fn missing_javap_is_an_error() {
        let javap = Javap::new(PathBuf::from("/nonexistent/jarwalk/javap"));
        let err = javap
            .disassemble(Path::new("demo.jar"), "Demo", &[])
            .unwrap_err();
        assert!(err.to_string().contains("failed to execute"));
    }

    #[test]
    fn dex2jar_writes_requested_output() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fake = dir.path().join("d2j-dex2jar.sh");
        write_script(
            &fake,
            r#"#!/bin/sh
[ "$1" = "-o" ] || exit 2
cp "$3" "$2"
"#,
        )?;
        let input = dir.path().join("classes.dex");
        let output = dir.path().join("classes.jar");
        fs::write(&input, b"dex")?;

        Dex2Jar::new(fake).convert(&input, &output)?;
        assert_eq!(fs::read(&output)?, b"dex");
        Ok(())
    }

    #[test]
    fn dex2jar_without_output_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fake = dir.path().join("dex2jar");
        write_script(&fake, "#!/bin/sh\nexit 0\n")?;

        let err = Dex2Jar::new(fake)
            .convert(&dir.path().join("in.dex"), &dir.path().join("out.jar"))
            .unwrap_err();
        assert!(err.to_string().contains("dex2jar did not produce"));
        Ok(())
    }
}
