use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::activity::{Activity, Color};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    /// Rows are `(index, activity)` with a zero-based index; the table shows
    /// it 1-based, which is what `show`/`edit`/`delete` accept.
    #[tracing::instrument(skip_all, fields(rows = rows.len()))]
    pub fn print_activity_table(&self, rows: &[(usize, &Activity)]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_activity_table(&mut out, rows)
    }

    pub fn write_activity_table<W: Write>(
        &self,
        writer: W,
        rows: &[(usize, &Activity)],
    ) -> anyhow::Result<()> {
        let headers = vec![
            "#".to_string(),
            "Color".to_string(),
            "Title".to_string(),
            "Description".to_string(),
        ];

        let cells = rows
            .iter()
            .map(|(index, activity)| {
                vec![
                    self.paint(&(index + 1).to_string(), "33"),
                    self.swatch(&activity.color),
                    activity.title.clone(),
                    first_line(&activity.description).to_string(),
                ]
            })
            .collect();

        write_table(writer, headers, cells)
    }

    #[tracing::instrument(skip(self, activity))]
    pub fn print_activity_info(&self, index: usize, activity: &Activity) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "position     {}", index + 1)?;
        writeln!(
            out,
            "id           {}",
            activity
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string())
        )?;
        writeln!(out, "title        {}", activity.title)?;
        writeln!(out, "color        {}", self.swatch(&activity.color))?;
        writeln!(out, "description  {}", activity.description)?;

        Ok(())
    }

    pub fn print_colors(&self) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        for color in Color::ALL {
            writeln!(out, "{}", self.swatch(color.as_str()))?;
        }
        Ok(())
    }

    fn swatch(&self, color: &str) -> String {
        let code = match color.parse::<Color>() {
            Ok(Color::Red) => "31",
            Ok(Color::Orange) => "38;5;208",
            Ok(Color::Green) => "32",
            Err(_) => return color.to_string(),
        };
        self.paint(color, code)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| visible_width(h)).collect();

    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    let write_row = |writer: &mut W, row: &[String]| -> io::Result<()> {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let padding = width.saturating_sub(visible_width(cell));
                format!("{cell}{}", " ".repeat(padding))
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line.trim_end())
    };

    write_row(&mut writer, headers.as_slice())?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut writer, rule.as_slice())?;
    for row in &rows {
        write_row(&mut writer, row.as_slice())?;
    }

    Ok(())
}

fn visible_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_str())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            escaped = ch != 'm';
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
