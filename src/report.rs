//! Shared gate report shape.
//!
//! Every gate funnels its findings through one report type so the line
//! ordering contract (header, status, one line per finding) is enforced in a
//! single place and no accumulated item can be dropped on a partial path.

/// Process exit code for a gate run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateStatus {
    Pass,
    Fail,
}

impl GateStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            GateStatus::Pass => 0,
            GateStatus::Fail => 1,
        }
    }
}

/// Accumulated output of one gate invocation.
///
/// `header_lines` carry run context (resolved directories, counts),
/// `detail_lines` carry one finding each, already prefixed (`drift: `,
/// `missing: `). The status line is derived, never stored, so the count in
/// it always matches the detail list.
#[derive(Debug)]
pub struct GateReport {
    header_lines: Vec<String>,
    detail_lines: Vec<String>,
    failure_label: &'static str,
}

impl GateReport {
    /// `failure_label` names the counted quantity in the FAIL status line,
    /// e.g. `drift` or `missing`.
    pub fn new(failure_label: &'static str) -> Self {
        Self {
            header_lines: Vec::new(),
            detail_lines: Vec::new(),
            failure_label,
        }
    }

    pub fn push_header(&mut self, line: String) {
        self.header_lines.push(line);
    }

    pub fn push_detail(&mut self, line: String) {
        self.detail_lines.push(line);
    }

    pub fn status(&self) -> GateStatus {
        if self.detail_lines.is_empty() {
            GateStatus::Pass
        } else {
            GateStatus::Fail
        }
    }

    pub fn status_line(&self) -> String {
        match self.status() {
            GateStatus::Pass => "status: PASS".to_string(),
            GateStatus::Fail => format!(
                "status: FAIL ({}={})",
                self.failure_label,
                self.detail_lines.len()
            ),
        }
    }

    pub fn detail_lines(&self) -> &[String] {
        &self.detail_lines
    }

    /// Print the full report to stdout in contract order.
    pub fn print(&self) {
        for line in &self.header_lines {
            println!("{line}");
        }
        println!("{}", self.status_line());
        for line in &self.detail_lines {
            println!("{line}");
        }
    }
}
