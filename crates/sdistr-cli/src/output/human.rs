//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use sdistr_core::BuildReport;
use sdistr_core::ProjectMetadata;
use sdistr_core::SdistEntryKind;
use sdistr_core::SdistManifest;
use std::io::Write;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    /// `ls -l`-style type and permission column.
    fn format_mode(kind: &SdistEntryKind, mode: u32) -> String {
        let type_char = match kind {
            SdistEntryKind::File => '-',
            SdistEntryKind::Directory => 'd',
            SdistEntryKind::Symlink { .. } => 'l',
            SdistEntryKind::Other => '?',
        };
        let mut out = String::with_capacity(10);
        out.push(type_char);
        for shift in [6, 3, 0] {
            let bits = (mode >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        out
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_build_result(&self, output_path: &Path, report: &BuildReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Built {}",
                style("✓").green().bold(),
                output_path.display()
            ));
        } else {
            let _ = self
                .term
                .write_line(&format!("Built {}", output_path.display()));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        if report.symlinks_added > 0 {
            let _ = self.term.write_line(&format!(
                "  Symlinks:         {}",
                Self::format_number(report.symlinks_added)
            ));
        }
        if report.files_excluded > 0 {
            let _ = self.term.write_line(&format!(
                "  Files excluded:   {}",
                Self::format_number(report.files_excluded)
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            humanize_bytes(report.bytes_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Compressed size:  {}",
            humanize_bytes(report.bytes_compressed)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Compression:      {:.1}%",
                report.compression_percentage()
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_metadata(&self, metadata: &ProjectMetadata) -> Result<()> {
        // The descriptor is the payload; print it even in quiet mode.
        let mut stdout = std::io::stdout();
        stdout.write_all(&metadata.descriptor)?;
        stdout.flush()?;
        Ok(())
    }

    fn format_manifest_short(&self, manifest: &SdistManifest) -> Result<()> {
        for entry in &manifest.entries {
            self.term.write_line(&entry.path.display().to_string())?;
        }
        Ok(())
    }

    fn format_manifest_long(&self, manifest: &SdistManifest, human_readable: bool) -> Result<()> {
        for entry in &manifest.entries {
            let size = if human_readable {
                humanize_bytes(entry.size)
            } else {
                entry.size.to_string()
            };
            let mut line = format!(
                "{} {:>10} {}",
                Self::format_mode(&entry.kind, entry.mode),
                size,
                entry.path.display()
            );
            if let SdistEntryKind::Symlink { target } = &entry.kind {
                line.push_str(&format!(" -> {}", target.display()));
            }
            self.term.write_line(&line)?;
        }

        if !self.quiet {
            let _ = self.term.write_line("");
            let _ = self.term.write_line(&format!(
                "{} entries, {}",
                Self::format_number(manifest.len()),
                humanize_bytes(manifest.total_size())
            ));
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {message}", style("WARNING:").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("WARNING: {message}"));
        }
    }
}
