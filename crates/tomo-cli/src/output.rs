//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use tomo_core::{Folder, Note};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print one note per line
    pub fn print_notes(&self, notes: &[Note]) {
        match self.format {
            OutputFormat::Human => {
                if notes.is_empty() {
                    println!("No notes found.");
                    return;
                }
                for note in notes {
                    println!("{}", note_line(note));
                }
                println!("\n{} note(s)", notes.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(notes).unwrap());
            }
            OutputFormat::Quiet => {
                for note in notes {
                    println!("{}", note.id);
                }
            }
        }
    }

    /// Print notes under section headers (Pinned, then date buckets)
    pub fn print_note_sections(&self, sections: &[(String, Vec<Note>)]) {
        match self.format {
            OutputFormat::Human => {
                if sections.iter().all(|(_, notes)| notes.is_empty()) {
                    println!("No notes found.");
                    return;
                }
                let mut total = 0;
                for (label, notes) in sections {
                    if notes.is_empty() {
                        continue;
                    }
                    println!("── {} ──", label);
                    for note in notes {
                        println!("{}", note_line(note));
                    }
                    println!();
                    total += notes.len();
                }
                println!("{} note(s)", total);
            }
            OutputFormat::Json => {
                let value: Vec<serde_json::Value> = sections
                    .iter()
                    .map(|(label, notes)| serde_json::json!({"section": label, "notes": notes}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value).unwrap());
            }
            OutputFormat::Quiet => {
                for (_, notes) in sections {
                    for note in notes {
                        println!("{}", note.id);
                    }
                }
            }
        }
    }

    /// Print a single note in detail
    pub fn print_note(&self, note: &Note, folder_name: Option<&str>, snippet: Option<&str>) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", note.id);
                println!("Title:       {}", note.title);
                if let Some(name) = folder_name {
                    println!("Folder:      {}", name);
                }
                println!(
                    "Edited:      {}",
                    note.last_edited.format("%Y-%m-%d %H:%M")
                );
                let flags = flag_list(note);
                if !flags.is_empty() {
                    println!("State:       {}", flags.join(", "));
                }
                if let Some(date) = note.archived_date {
                    println!("Archived:    {}", date.format("%Y-%m-%d %H:%M"));
                }
                if let Some(date) = note.deleted_date {
                    println!("Deleted:     {}", date.format("%Y-%m-%d %H:%M"));
                }
                println!(
                    "Preview:     {}",
                    snippet.unwrap_or("No additional text")
                );
                if !note.images.is_empty() {
                    println!();
                    println!("── Images ({}) ──", note.images.len());
                    for image in &note.images {
                        let caption = if image.description.is_empty() {
                            "(no description)"
                        } else {
                            &image.description
                        };
                        println!(
                            "{} | {} | {}",
                            &image.id.to_string()[..8],
                            image.filename,
                            caption
                        );
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(note).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", note.id);
            }
        }
    }

    /// Print folders with their live note counts
    pub fn print_folders(&self, rows: &[(Folder, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if rows.is_empty() {
                    println!("No folders found.");
                    return;
                }
                for (folder, count) in rows {
                    let lock = if folder.is_locked { " [locked]" } else { "" };
                    println!(
                        "{} | {}{} | {} note(s)",
                        &folder.id.to_string()[..8],
                        truncate(&folder.name, 35),
                        lock,
                        count
                    );
                }
                println!("\n{} folder(s)", rows.len());
            }
            OutputFormat::Json => {
                let value: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|(folder, count)| serde_json::json!({"folder": folder, "notes": count}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value).unwrap());
            }
            OutputFormat::Quiet => {
                for (folder, _) in rows {
                    println!("{}", folder.id);
                }
            }
        }
    }
}

/// One-line listing for a note
fn note_line(note: &Note) -> String {
    let flags = flag_list(note);
    let marker = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(","))
    };
    format!(
        "{} | {}{} | {}",
        &note.id.to_string()[..8],
        truncate(&note.title, 40),
        marker,
        note.last_edited.format("%Y-%m-%d %H:%M")
    )
}

fn flag_list(note: &Note) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if note.is_pinned {
        flags.push("pinned");
    }
    if note.is_locked {
        flags.push("locked");
    }
    if note.is_archived {
        flags.push("archived");
    }
    if note.is_deleted {
        flags.push("deleted");
    }
    flags
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        // Quiet wins over json
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title indeed", 10), "a very ...");
    }

    #[test]
    fn test_note_line_flags() {
        let mut note = Note::new(None);
        note.title = "Pinned one".to_string();
        note.is_pinned = true;
        let line = note_line(&note);
        assert!(line.contains("Pinned one"));
        assert!(line.contains("[pinned]"));
    }
}
