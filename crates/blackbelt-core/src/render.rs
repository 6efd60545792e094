use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use blackbelt_shared::belt::belt_threshold;
use blackbelt_shared::{AddButtonPlacement, BELTS, Belt, BeltLabel, Quest, StatusFilter};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

pub struct Renderer {
    color: bool,
    out: Box<dyn Write>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").field("color", &self.color).finish()
    }
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = color_setting(cfg)? && io::stdout().is_terminal();
        Ok(Self {
            color,
            out: Box::new(io::stdout()),
        })
    }

    /// Renders into `out` instead of stdout, honoring the config's color
    /// setting without a terminal check.
    pub fn with_writer(cfg: &Config, out: Box<dyn Write>) -> anyhow::Result<Self> {
        Ok(Self {
            color: color_setting(cfg)?,
            out,
        })
    }

    #[tracing::instrument(skip(self, quests))]
    pub fn print_quest_table(
        &mut self,
        quests: &[Quest],
        filter: StatusFilter,
        total: usize,
    ) -> anyhow::Result<()> {
        if quests.is_empty() {
            return self.print_empty(filter, total);
        }

        let headers = vec![
            "Quest".to_string(),
            "Belt".to_string(),
            "Progress".to_string(),
            "Status".to_string(),
        ];

        let rows = quests
            .iter()
            .map(|quest| {
                let label = BeltLabel::for_progress(quest.progress);
                vec![
                    quest.name.clone(),
                    self.paint_belt(label.belt, label.belt.name),
                    format!("{}%", quest.progress),
                    quest.status.to_string(),
                ]
            })
            .collect();

        write_table(&mut self.out, headers, rows)?;
        Ok(())
    }

    pub fn print_belt_table(&mut self) -> anyhow::Result<()> {
        let headers = vec!["Belt".to_string(), "From".to_string(), "Until".to_string()];

        let rows = BELTS
            .iter()
            .enumerate()
            .map(|(idx, belt)| {
                let until = if idx + 1 < BELTS.len() {
                    format!("{}%", belt_threshold(idx + 1).saturating_sub(1))
                } else {
                    "100%".to_string()
                };
                vec![
                    self.paint_belt(belt, belt.name),
                    format!("{}%", belt_threshold(idx)),
                    until,
                ]
            })
            .collect();

        write_table(&mut self.out, headers, rows)?;
        Ok(())
    }

    pub fn print_label(&mut self, quest: &Quest) -> anyhow::Result<()> {
        let label = BeltLabel::for_progress(quest.progress);
        let text = self.paint_belt(label.belt, &label.to_string());
        writeln!(self.out, "{}  {}", quest.name, text)?;
        Ok(())
    }

    pub fn print_line(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// `total` is the size of the unfiltered list; the add hint only shows
    /// on an empty board.
    fn print_empty(&mut self, filter: StatusFilter, total: usize) -> anyhow::Result<()> {
        match AddButtonPlacement::for_quest_count(total) {
            AddButtonPlacement::Center => writeln!(
                self.out,
                "No quests yet. Start one with: blackbelt add <name>"
            )?,
            AddButtonPlacement::Corner => writeln!(self.out, "No {filter} quests.")?,
        }
        Ok(())
    }

    fn paint_belt(&self, belt: &Belt, text: &str) -> String {
        let (r, g, b) = belt.rgb();
        self.paint(text, &format!("1;38;2;{r};{g};{b}"))
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn color_setting(cfg: &Config) -> anyhow::Result<bool> {
    let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
    match color_cfg.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(anyhow!("invalid color setting: {other}")),
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_columns_align_on_visible_width() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec!["\x1b[31mred\x1b[0m".to_string(), "x".to_string()],
                vec!["longer".to_string(), "y".to_string()],
            ],
        )
        .expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A      B ");
        assert_eq!(lines[1], "------ - ");
        assert_eq!(strip_ansi(lines[2]), "red    x ");
        assert_eq!(lines[3], "longer y ");
    }

    #[test]
    fn strip_ansi_removes_color_codes() {
        assert_eq!(strip_ansi("\x1b[1;38;2;0;0;0mBlack Belt\x1b[0m"), "Black Belt");
    }
}
