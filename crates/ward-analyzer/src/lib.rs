mod rules;

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use ward_core::call_signature;
use ward_types::{IssueType, QualityIssue, TaskDefinition};

/// Tunables for the analyzer (mirrors `EngineConfig`'s C2 knobs so this
/// crate stays independent of the broader config type).
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerConfig {
    pub loop_window: usize,
    pub loop_threshold: usize,
    pub max_same_tool: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            loop_window: 5,
            loop_threshold: 3,
            max_same_tool: 10,
        }
    }
}

/// Result of analyzing one step: independently-accumulated issues plus
/// whether this call is an exact duplicate (the only rule that affects
/// step status; see spec §4.2 "first matching rule wins for status").
#[derive(Debug, Default)]
pub struct StepAnalysis {
    pub issues: Vec<QualityIssue>,
    pub redundant: bool,
}

impl StepAnalysis {
    pub fn loop_detected(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.issue_type == IssueType::InfiniteLoop && i.severity >= 8)
    }
}

/// Pure, bounded-memory per-session analyzer state. Reset on every new
/// session; driven only by `(tool_name, tool_input, step_number)`.
pub struct AnalyzerState {
    config: AnalyzerConfig,
    recent: VecDeque<(String, String)>, // (tool_name, canonical_signature)
    uses: HashMap<String, u32>,
    seen_hashes: std::collections::HashSet<String>,
}

impl AnalyzerState {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            recent: VecDeque::with_capacity(config.loop_window),
            uses: HashMap::new(),
            seen_hashes: std::collections::HashSet::new(),
        }
    }

    pub fn reset(&mut self) {
        self.recent.clear();
        self.uses.clear();
        self.seen_hashes.clear();
    }

    /// Classify one step. `step_number` seeds issue ids so they're stable
    /// and unique within a session without needing a random source here.
    pub fn analyze_step(&mut self, tool_name: &str, tool_input: &Value, step_number: u32) -> StepAnalysis {
        let mut analysis = StepAnalysis::default();
        let id_base = format!("step-{step_number}");
        let signature = call_signature(tool_name, tool_input);

        // Rule 1: security bypass patterns, independent of the others.
        analysis.issues.extend(rules::scan_security_bypass(&id_base, tool_input));

        // Rule 2: exact duplicate.
        if self.seen_hashes.contains(&signature) {
            analysis.redundant = true;
            analysis.issues.push(QualityIssue::new(
                format!("{id_base}-dup"),
                IssueType::Inefficiency,
                3,
                "exact duplicate tool call",
            ));
        } else {
            self.seen_hashes.insert(signature.clone());
        }

        // Rule 3: per-tool overuse.
        let count = self.uses.entry(tool_name.to_string()).or_insert(0);
        *count += 1;
        if *count as usize == self.config.max_same_tool {
            analysis.issues.push(QualityIssue::new(
                format!("{id_base}-overuse"),
                IssueType::InfiniteLoop,
                8,
                format!("tool `{tool_name}` called {} times in one session", self.config.max_same_tool),
            ));
        }

        // Rule 4: evasion loop — same tool name repeated in the window
        // regardless of differing input.
        let same_tool_in_window = self.recent.iter().filter(|(name, _)| name == tool_name).count();
        if same_tool_in_window >= 2 {
            analysis.issues.push(QualityIssue::new(
                format!("{id_base}-evasion"),
                IssueType::SuspiciousBehavior,
                7,
                "disguised loop — varying inputs",
            ));
        }

        // Rule 5: pattern repetition over the sliding window.
        self.recent.push_back((tool_name.to_string(), signature.clone()));
        if self.recent.len() > self.config.loop_window {
            self.recent.pop_front();
        }
        if self.recent.len() == self.config.loop_window {
            let mut tally: HashMap<&str, usize> = HashMap::new();
            for (_, sig) in &self.recent {
                *tally.entry(sig.as_str()).or_insert(0) += 1;
            }
            if let Some((_, count)) = tally.into_iter().max_by_key(|(_, c)| *c) {
                if count >= self.config.loop_threshold {
                    analysis.issues.push(QualityIssue::new(
                        format!("{id_base}-loop"),
                        IssueType::InfiniteLoop,
                        9,
                        "repeated call signature within the sliding window",
                    ));
                }
            }
        }

        analysis
    }

    /// Rule 6: post-session efficiency check, called once at session end.
    pub fn check_efficiency(total_steps: usize, task: &TaskDefinition) -> Option<QualityIssue> {
        if total_steps as f64 > 1.5 * task.max_steps as f64 {
            Some(QualityIssue::new(
                "session-efficiency",
                IssueType::Inefficiency,
                5,
                format!(
                    "session used {total_steps} steps against a budget of {}",
                    task.max_steps
                ),
            ))
        } else {
            None
        }
    }
}
