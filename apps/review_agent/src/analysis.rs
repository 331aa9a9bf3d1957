// review_agent/src/analysis.rs

//! Line-level code smell detection used by the review workflow.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Literal pattern; compiling it cannot fail.
static SMELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"TODO|FIXME|console\.log|any ").expect("smell pattern compiles"));

/// A file of the reviewed tree. `content` is absent when the file could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
  pub path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<String>,
}

/// One flagged line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
  pub path: String,
  /// 1-based.
  pub line: usize,
  pub code: String,
  pub suggestion: String,
}

pub fn suggestion_for(line: &str) -> &'static str {
  if line.contains("TODO") || line.contains("FIXME") {
    "Resolve the TODO/FIXME with proper implementation."
  } else if line.contains("console.log") {
    "Remove debug statements before production."
  } else if line.contains("any ") {
    "Replace `any` with a specific type."
  } else {
    "Review this line for best practices."
  }
}

/// Flags every matching line of every readable file, in file then line order.
pub fn find_problems(files: &[SourceFile]) -> Vec<Problem> {
  let mut problems = Vec::new();
  for file in files {
    let Some(content) = file.content.as_deref() else {
      continue;
    };
    for (index, line) in content.split('\n').enumerate() {
      if SMELL.is_match(line) {
        problems.push(Problem {
          path: file.path.clone(),
          line: index + 1,
          code: line.trim().to_string(),
          suggestion: suggestion_for(line).to_string(),
        });
      }
    }
  }
  problems
}
