use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::activity::Color;

pub const RC_ENV: &str = "ACTIVITYRC";

const DATA_LOCATION: &str =
  "data.location";
const COLOR: &str = "color";
const DEFAULT_COLOR: &str =
  "default.color";

/// Settings from `~/.activityrc` (or `$ACTIVITYRC` / `--activityrc`) plus
/// `--rc` overrides.
#[derive(Debug, Clone)]
pub struct Config {
  settings:         HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

#[derive(Debug, PartialEq, Eq)]
enum RcLine<'a> {
  Include(&'a str),
  Setting(&'a str, &'a str)
}

impl Default for Config {
  fn default() -> Self {
    let settings = [
      (DATA_LOCATION, "~/.activities"),
      (COLOR, "on"),
      (
        DEFAULT_COLOR,
        Color::Green.as_str()
      )
    ]
    .into_iter()
    .map(|(k, v)| {
      (k.to_string(), v.to_string())
    })
    .collect();

    Self {
      settings,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    match rc_path(
      rc_override,
      std::env::var(RC_ENV).ok()
    ) {
      | Some(path) => {
        info!(rc = %path.display(), "loading activityrc");
        cfg.load_file(&path)?;
      }
      | None => {
        debug!("no activityrc; using defaults");
      }
    }

    Ok(cfg)
  }

  /// Applies `key=value` pairs; a leading `rc.` on the key is optional.
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      let key = key
        .strip_prefix("rc.")
        .map(str::to_string)
        .unwrap_or(key);
      debug!(key = %key, value = %value, "applying override");
      self.set(key, value);
    }
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .settings
      .get(key)
      .map(|raw| {
        parse_bool(raw).ok_or_else(
          || {
            anyhow!(
              "invalid {key} setting: \
               {raw}"
            )
          }
        )
      })
      .transpose()
  }

  /// Color given to new activities when none is passed explicitly.
  pub fn default_color(
    &self
  ) -> anyhow::Result<Color> {
    match self
      .settings
      .get(DEFAULT_COLOR)
    {
      | Some(raw) => {
        raw.parse().map_err(|reason| {
          anyhow!(
            "invalid \
             {DEFAULT_COLOR}: \
             {reason}"
          )
        })
      }
      | None => Ok(Color::Green)
    }
  }

  /// Directory holding the activity file: `--data` wins over
  /// `data.location`.
  pub fn data_dir(
    &self,
    override_dir: Option<&Path>
  ) -> PathBuf {
    if let Some(dir) = override_dir {
      return dir.to_path_buf();
    }
    home_relative(
      self
        .settings
        .get(DATA_LOCATION)
        .map_or(
          "~/.activities",
          String::as_str
        )
    )
  }

  #[tracing::instrument(skip(self))]
  pub fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let text =
      fs::read_to_string(path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    self
      .loaded_files
      .push(path.to_path_buf());

    let base_dir = path
      .parent()
      .unwrap_or(Path::new("."));

    for (idx, raw_line) in
      text.lines().enumerate()
    {
      let parsed = parse_rc_line(
        raw_line
      )
      .with_context(|| {
        format!(
          "{}:{}",
          path.display(),
          idx + 1
        )
      })?;

      match parsed {
        | None => {}
        | Some(RcLine::Setting(
          key,
          value
        )) => {
          trace!(key, value, "rc setting");
          self.set(
            key.to_string(),
            value.to_string()
          );
        }
        | Some(RcLine::Include(
          include
        )) => {
          let target = base_dir
            .join(home_relative(
              include
            ));
          if self
            .loaded_files
            .contains(&target)
          {
            warn!(include = %target.display(), "include cycle; skipping");
          } else if target.exists() {
            self.load_file(&target)?;
          } else {
            warn!(include = %target.display(), "include file does not exist; skipping");
          }
        }
      }
    }

    Ok(())
  }

  fn set(
    &mut self,
    key: String,
    value: String
  ) {
    if ![
      DATA_LOCATION,
      COLOR,
      DEFAULT_COLOR
    ]
    .contains(&key.as_str())
    {
      warn!(key = %key, "unknown setting; keeping it anyway");
    }
    self.settings.insert(key, value);
  }
}

fn parse_rc_line(
  raw: &str
) -> anyhow::Result<Option<RcLine<'_>>>
{
  let line = raw
    .split_once('#')
    .map_or(raw, |(before, _)| before)
    .trim();

  if line.is_empty() {
    return Ok(None);
  }

  if let Some(include) =
    line.strip_prefix("include ")
  {
    let include = include.trim();
    if include.is_empty() {
      return Err(anyhow!(
        "include needs a path"
      ));
    }
    return Ok(Some(RcLine::Include(
      include
    )));
  }

  let (key, value) = line
    .split_once('=')
    .ok_or_else(|| {
      anyhow!(
        "expected key = value, got: \
         {raw}"
      )
    })?;
  Ok(Some(RcLine::Setting(
    key.trim(),
    value.trim()
  )))
}

/// Explicit path, then the env value (`/dev/null` disables), then
/// `~/.activityrc` if it exists.
fn rc_path(
  explicit: Option<&Path>,
  env_value: Option<String>
) -> Option<PathBuf> {
  if let Some(path) = explicit {
    return Some(path.to_path_buf());
  }
  if let Some(value) = env_value {
    return (value != "/dev/null")
      .then(|| PathBuf::from(value));
  }
  dirs::home_dir()
    .map(|home| {
      home.join(".activityrc")
    })
    .filter(|path| path.exists())
}

fn home_relative(
  path: &str
) -> PathBuf {
  match (
    path.strip_prefix("~/"),
    dirs::home_dir()
  ) {
    | (Some(rest), Some(home)) => {
      home.join(rest)
    }
    | _ => PathBuf::from(path)
  }
}

fn parse_bool(
  s: &str
) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn defaults_cover_data_color_and_default_color()
   {
    let cfg = Config::default();

    assert_eq!(
      cfg
        .settings
        .get(DATA_LOCATION)
        .map(String::as_str),
      Some("~/.activities")
    );
    assert_eq!(
      cfg.get_bool(COLOR).unwrap(),
      Some(true)
    );
    assert_eq!(
      cfg.default_color().unwrap(),
      Color::Green
    );
  }

  #[test]
  fn rc_lines_parse_into_settings_and_includes()
   {
    assert_eq!(
      parse_rc_line("  # note").unwrap(),
      None
    );
    assert_eq!(
      parse_rc_line("color = off # x")
        .unwrap(),
      Some(RcLine::Setting(
        "color", "off"
      ))
    );
    assert_eq!(
      parse_rc_line("include a.rc")
        .unwrap(),
      Some(RcLine::Include("a.rc"))
    );
    assert!(
      parse_rc_line("just words")
        .is_err()
    );
  }

  #[test]
  fn rc_file_with_comments_and_include()
   {
    let temp =
      tempdir().expect("tempdir");
    let extra = temp.path().join("extra.rc");
    fs::write(
      &extra,
      "default.color = orange\n"
    )
    .unwrap();

    let main = temp.path().join("main.rc");
    fs::write(
      &main,
      "# activity settings\n\
       data.location = /tmp/acts  # trailing\n\
       \n\
       color=off\n\
       include extra.rc\n"
    )
    .unwrap();

    let mut cfg = Config::default();
    cfg.load_file(&main).unwrap();

    assert_eq!(
      cfg.data_dir(None),
      PathBuf::from("/tmp/acts")
    );
    assert_eq!(
      cfg.get_bool(COLOR).unwrap(),
      Some(false)
    );
    assert_eq!(
      cfg.default_color().unwrap(),
      Color::Orange
    );
    assert_eq!(cfg.loaded_files.len(), 2);
  }

  #[test]
  fn self_include_does_not_recurse() {
    let temp =
      tempdir().expect("tempdir");
    let main = temp.path().join("main.rc");
    fs::write(
      &main,
      "color = on\ninclude main.rc\n"
    )
    .unwrap();

    let mut cfg = Config::default();
    cfg.load_file(&main).unwrap();
    assert_eq!(cfg.loaded_files.len(), 1);
  }

  #[test]
  fn malformed_line_names_file_and_line()
   {
    let temp =
      tempdir().expect("tempdir");
    let main = temp.path().join("bad.rc");
    fs::write(
      &main,
      "color = on\njust words\n"
    )
    .unwrap();

    let err = Config::default()
      .load_file(&main)
      .unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("bad.rc:2"));
    assert!(text.contains("key = value"));
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::default();
    cfg.apply_overrides([
      (
        "rc.default.color".to_string(),
        "red".to_string()
      ),
      (
        COLOR.to_string(),
        "no".to_string()
      ),
    ]);

    assert_eq!(
      cfg.default_color().unwrap(),
      Color::Red
    );
    assert_eq!(
      cfg.get_bool(COLOR).unwrap(),
      Some(false)
    );
  }

  #[test]
  fn booleans_accept_short_forms_and_reject_junk()
   {
    let mut cfg = Config::default();
    for (raw, expected) in [
      ("y", true),
      ("YES", true),
      ("n", false),
      ("0", false)
    ] {
      cfg.apply_overrides([(
        COLOR.to_string(),
        raw.to_string()
      )]);
      assert_eq!(
        cfg.get_bool(COLOR).unwrap(),
        Some(expected)
      );
    }

    cfg.apply_overrides([(
      COLOR.to_string(),
      "maybe".to_string()
    )]);
    assert!(
      cfg.get_bool(COLOR).is_err()
    );
    assert_eq!(
      cfg.get_bool("missing").unwrap(),
      None
    );
  }

  #[test]
  fn bad_default_color_is_reported() {
    let mut cfg = Config::default();
    cfg.apply_overrides([(
      DEFAULT_COLOR.to_string(),
      "blue".to_string()
    )]);
    assert!(
      cfg.default_color().is_err()
    );
  }

  #[test]
  fn rc_path_resolution_order() {
    assert_eq!(
      rc_path(
        Some(Path::new("/x/rc")),
        Some("/y/rc".to_string())
      ),
      Some(PathBuf::from("/x/rc"))
    );
    assert_eq!(
      rc_path(
        None,
        Some("/y/rc".to_string())
      ),
      Some(PathBuf::from("/y/rc"))
    );
    assert_eq!(
      rc_path(
        None,
        Some("/dev/null".to_string())
      ),
      None
    );
  }

  #[test]
  fn data_dir_prefers_the_override() {
    let cfg = Config::default();
    let dir = Path::new("/srv/acts");

    assert_eq!(
      cfg.data_dir(Some(dir)),
      dir.to_path_buf()
    );
    assert_ne!(
      cfg.data_dir(None),
      dir.to_path_buf()
    );
  }
}
