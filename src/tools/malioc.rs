//! Mali 离线编译器（malioc）调用与输出解析

use super::{ShaderCycleReport, ShaderCycleTool, ToolError};
use crate::config::ShaderCycleSettings;
use crate::frame::ShaderStage;
use crossbeam_channel::RecvTimeoutError;
use std::env;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// 显式路径之外的环境变量
pub const MALIOC_PATH_ENV: &str = "MALIOC_PATH";

const EXECUTABLE_NAME: &str = if cfg!(windows) { "malioc.exe" } else { "malioc" };

/// 常见安装位置
const KNOWN_LOCATIONS: &[&str] = &[
    r"C:\Program Files\Arm\Mali Developer Tools\Mali Offline Compiler\malioc.exe",
    r"C:\Program Files\Arm GPU Tools\Mali Offline Compiler\malioc.exe",
    "/opt/arm/mali-offline-compiler/bin/malioc",
    "/usr/local/bin/malioc",
    "/usr/bin/malioc",
    "/Applications/Arm/Mali Developer Tools/Mali Offline Compiler/malioc",
];

/// 进程状态轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// malioc 调用器
#[derive(Debug, Clone)]
pub struct MaliocRunner {
    executable: Option<PathBuf>,
    target_gpu: String,
    timeout: Duration,
}

impl MaliocRunner {
    /// 按 显式路径 → `MALIOC_PATH` → `PATH` → 常见安装位置 的顺序查找编译器
    pub fn new(explicit: Option<&Path>, target_gpu: impl Into<String>, timeout: Duration) -> Self {
        let executable = locate(explicit);
        match &executable {
            Some(path) => tracing::debug!(target: "shader_tool", "Using malioc at {}", path.display()),
            None => tracing::info!(target: "shader_tool", "malioc not found, shader cycle analysis is degraded"),
        }
        Self {
            executable,
            target_gpu: target_gpu.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &ShaderCycleSettings) -> Self {
        Self::new(
            settings.tool_path.as_deref(),
            settings.target_gpu.clone(),
            Duration::from_millis(settings.timeout_ms),
        )
    }

    /// 直接指定可执行文件，跳过查找
    pub fn with_executable(path: impl Into<PathBuf>, target_gpu: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: Some(path.into()),
            target_gpu: target_gpu.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.executable.is_some()
    }

    /// 运行编译器并在超时内收集标准输出
    fn run(&self, executable: &Path, shader_path: &Path) -> Result<String, ToolError> {
        let mut child = Command::new(executable)
            .arg("--core")
            .arg(&self.target_gpu)
            .arg(shader_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    ToolError::Unavailable(format!("{}: {}", executable.display(), e))
                }
                _ => ToolError::Io(e),
            })?;

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());
        let deadline = Instant::now() + self.timeout;
        let after_ms = self.timeout.as_millis() as u64;

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(target: "shader_tool", "malioc timed out after {}ms", after_ms);
                return Err(ToolError::Timeout { after_ms });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let remaining = deadline.saturating_duration_since(Instant::now()).max(POLL_INTERVAL);
        let output = match stdout.recv_timeout(remaining) {
            Ok(output) => output,
            Err(RecvTimeoutError::Timeout) => return Err(ToolError::Timeout { after_ms }),
            Err(RecvTimeoutError::Disconnected) => String::new(),
        };

        if !status.success() {
            let stderr = stderr.recv_timeout(POLL_INTERVAL * 10).unwrap_or_default();
            return Err(ToolError::Failed {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl ShaderCycleTool for MaliocRunner {
    fn name(&self) -> &str {
        "malioc"
    }

    fn analyze(&self, source: &str, stage: ShaderStage) -> Result<ShaderCycleReport, ToolError> {
        let executable = self
            .executable
            .as_deref()
            .ok_or_else(|| ToolError::Unavailable("malioc executable not found".to_string()))?;

        let mut shader_file = tempfile::Builder::new()
            .prefix("shader_")
            .suffix(stage.file_extension())
            .tempfile()?;
        shader_file.write_all(source.as_bytes())?;
        shader_file.flush()?;

        let output = self.run(executable, shader_file.path())?;
        parse_report(&output)
    }
}

/// 在独立线程中读完管道，结果通过通道返回
fn spawn_reader<R>(pipe: Option<R>) -> crossbeam_channel::Receiver<String>
where
    R: Read + Send + 'static,
{
    let (sender, receiver) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buffer);
        }
        let _ = sender.send(buffer);
    });
    receiver
}

fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(target: "shader_tool", "Configured malioc path not found: {}", path.display());
    }

    if let Some(path) = env::var_os(MALIOC_PATH_ENV).map(PathBuf::from) {
        if path.is_file() {
            return Some(path);
        }
    }

    if let Some(paths) = env::var_os("PATH") {
        if let Some(found) = env::split_paths(&paths)
            .map(|dir| dir.join(EXECUTABLE_NAME))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }
    }

    KNOWN_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// 解析 malioc 的文本报告
///
/// 逐行识别 `标签: 数值` 形式，标签不区分大小写。一个字段都没有识别出时返回
/// [`ToolError::InvalidOutput`]。
pub fn parse_report(text: &str) -> Result<ShaderCycleReport, ToolError> {
    let mut report = ShaderCycleReport::default();
    let mut recognized = 0usize;

    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim().to_ascii_lowercase();
        let value = value.trim();

        if label == "stack spilling" {
            let lowered = value.to_ascii_lowercase();
            report.stack_spilling = lowered.starts_with("yes") || lowered.starts_with("true");
            recognized += 1;
            continue;
        }

        let Some(number) = leading_number(value) else {
            continue;
        };

        match label.as_str() {
            "work registers" => report.work_registers = number as u32,
            "uniform registers" => report.uniform_registers = number as u32,
            "arithmetic" => report.arithmetic_cycles = number,
            "load/store" => report.load_store_cycles = number,
            "varying" => report.varying_cycles = number,
            "texture" => report.texture_cycles = number,
            "total cycles" | "total instruction cycles" => report.total_cycles = number,
            "shortest path cycles" => report.shortest_path_cycles = Some(number),
            "longest path cycles" => report.longest_path_cycles = Some(number),
            "total instructions" => report.total_instructions = number as u32,
            "arithmetic instructions" => report.arithmetic_instructions = number as u32,
            "load/store instructions" => report.load_store_instructions = number as u32,
            "texture instructions" => report.texture_instructions = number as u32,
            "branch instructions" => report.branch_instructions = number as u32,
            _ => continue,
        }
        recognized += 1;
    }

    if recognized == 0 {
        return Err(ToolError::InvalidOutput(
            text.lines().next().unwrap_or_default().trim().to_string(),
        ));
    }

    if report.total_cycles == 0.0 {
        report.total_cycles = report
            .arithmetic_cycles
            .max(report.load_store_cycles)
            .max(report.varying_cycles)
            .max(report.texture_cycles);
    }

    Ok(report)
}

/// 取值的第一个数字记号，例如 `"2.50 cycles"` → 2.5
fn leading_number(value: &str) -> Option<f64> {
    let token = value.split_whitespace().next()?;
    let end = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    token[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = "\
Mali Offline Compiler v7.5.0 (Build 1a2b3c)
Configuration
=============
Hardware: Mali-G78 r1p1
Work registers: 32
Uniform registers: 16
Stack spilling: No

  Arithmetic: 2.50 cycles
  Load/Store: 1.00 cycles
  Varying: 0.75 cycles
  Texture: 3.00 cycles
Shortest path cycles: 1.25
Longest path cycles: 3.00
Total instructions: 48
Texture instructions: 6
Branch instructions: 2
";

    #[test]
    fn test_parse_without_total_uses_max_unit() {
        let report = parse_report(SAMPLE_OUTPUT).unwrap();
        assert_eq!(report.work_registers, 32);
        assert_eq!(report.uniform_registers, 16);
        assert!(!report.stack_spilling);
        assert_eq!(report.arithmetic_cycles, 2.5);
        assert_eq!(report.varying_cycles, 0.75);
        assert_eq!(report.total_cycles, 3.0);
        assert_eq!(report.shortest_path_cycles, Some(1.25));
        assert_eq!(report.total_instructions, 48);
        assert_eq!(report.texture_instructions, 6);
        assert_eq!(report.branch_instructions, 2);
    }

    #[test]
    fn test_parse_explicit_total_and_spilling() {
        let report = parse_report(
            "Work registers: 64\nStack spilling: Yes\nArithmetic: 12\nTotal instruction cycles: 80.5\n",
        )
        .unwrap();
        assert!(report.stack_spilling);
        assert_eq!(report.total_cycles, 80.5);
    }

    #[test]
    fn test_parse_rejects_unrelated_text() {
        let err = parse_report("ERROR: could not compile\nsyntax error at line 3").unwrap_err();
        assert!(matches!(err, ToolError::InvalidOutput(_)));
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let runner = MaliocRunner {
            executable: None,
            target_gpu: "Mali-G78".to_string(),
            timeout: Duration::from_secs(1),
        };
        let err = runner
            .analyze("void main() {}", ShaderStage::Fragment)
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_explicit_missing_path_is_not_used() {
        assert_ne!(
            locate(Some(Path::new("/definitely/not/here/malioc"))),
            Some(PathBuf::from("/definitely/not/here/malioc"))
        );
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("malioc");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_fake_tool_output_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "echo \"Work registers: 40\"\necho \"Total cycles: 72\"",
        );
        let runner = MaliocRunner::with_executable(tool, "Mali-G78", Duration::from_secs(10));

        let report = runner.analyze("void main() {}", ShaderStage::Fragment).unwrap();
        assert_eq!(report.work_registers, 40);
        assert_eq!(report.total_cycles, 72.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_fake_tool_failure_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "echo \"bad core\" >&2\nexit 3");
        let runner = MaliocRunner::with_executable(tool, "Mali-X1", Duration::from_secs(10));

        let err = runner.analyze("void main() {}", ShaderStage::Vertex).unwrap_err();
        match err {
            ToolError::Failed { stderr, .. } => assert_eq!(stderr, "bad core"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_fake_tool_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "sleep 5");
        let runner = MaliocRunner::with_executable(tool, "Mali-G78", Duration::from_millis(200));

        let started = Instant::now();
        let err = runner.analyze("void main() {}", ShaderStage::Compute).unwrap_err();
        assert!(matches!(err, ToolError::Timeout { after_ms: 200 }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_wait_shares_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        // 后台进程继承 stdout，管道在脚本退出后仍保持打开
        let tool = fake_tool(dir.path(), "sleep 5 &\nsleep 0.7\nexit 0");
        let runner = MaliocRunner::with_executable(tool, "Mali-G78", Duration::from_millis(1000));

        let started = Instant::now();
        let err = runner.analyze("void main() {}", ShaderStage::Fragment).unwrap_err();
        assert!(matches!(err, ToolError::Timeout { after_ms: 1000 }));
        assert!(started.elapsed() < Duration::from_millis(1500), "took {:?}", started.elapsed());
    }
}
