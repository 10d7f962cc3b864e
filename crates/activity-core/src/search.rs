use std::borrow::Cow;

use tracing::trace;

use crate::activity::Activity;

/// Case-insensitive substring search over title and description.
///
/// A blank query hands back `all` itself rather than a copy.
pub fn search<'a>(
  all: &'a [Activity],
  query: &str
) -> Cow<'a, [Activity]> {
  let Some(needle) = needle(query)
  else {
    return Cow::Borrowed(all);
  };

  Cow::Owned(
    all
      .iter()
      .filter(|activity| {
        matches_needle(
          activity, &needle
        )
      })
      .cloned()
      .collect()
  )
}

/// Positions in `all` of the activities [`search`] would return.
pub fn search_positions(
  all: &[Activity],
  query: &str
) -> Vec<usize> {
  let needle = needle(query);

  all
    .iter()
    .enumerate()
    .filter(|(_, activity)| {
      needle.as_deref().is_none_or(
        |needle| {
          matches_needle(
            activity, needle
          )
        }
      )
    })
    .map(|(idx, _)| idx)
    .collect()
}

fn needle(
  query: &str
) -> Option<String> {
  let trimmed = query.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_lowercase())
  }
}

fn matches_needle(
  activity: &Activity,
  needle: &str
) -> bool {
  let hit = activity
    .title
    .to_lowercase()
    .contains(needle)
    || activity
      .description
      .to_lowercase()
      .contains(needle);
  trace!(title = %activity.title, needle, hit, "search match");
  hit
}

#[cfg(test)]
mod tests {
  use std::borrow::Cow;

  use super::{
    search,
    search_positions
  };
  use crate::activity::{
    Activity,
    Color
  };

  fn sample() -> Vec<Activity> {
    vec![
      Activity::new(
        "Buy Milk",
        "from the corner shop",
        Color::Red
      ),
      Activity::new(
        "Walk dog",
        "around the park",
        Color::Green
      ),
      Activity::new(
        "Call mum",
        "ask about the MILKMAN",
        Color::Orange
      ),
    ]
  }

  #[test]
  fn blank_query_returns_the_same_slice()
   {
    let all = sample();

    for query in ["", "   ", "\t"] {
      let found = search(&all, query);
      assert!(matches!(
        found,
        Cow::Borrowed(_)
      ));
      assert!(std::ptr::eq(
        found.as_ref(),
        all.as_slice()
      ));
    }
  }

  #[test]
  fn query_is_case_insensitive() {
    let all = vec![
      Activity::new(
        "Buy Milk",
        "x",
        Color::Red
      ),
      Activity::new(
        "Walk dog",
        "y",
        Color::Green
      ),
    ];

    let found = search(&all, "MILK");
    assert_eq!(
      found.as_ref(),
      &all[..1]
    );
  }

  #[test]
  fn description_matches_keep_original_order()
   {
    let all = sample();

    let found = search(&all, "milk");
    let titles: Vec<&str> = found
      .iter()
      .map(|a| a.title.as_str())
      .collect();
    assert_eq!(
      titles,
      vec!["Buy Milk", "Call mum"]
    );
    assert_eq!(
      search_positions(&all, "milk"),
      vec![0, 2]
    );
  }

  #[test]
  fn no_match_is_empty_not_identity() {
    let all = sample();

    assert!(
      search(&all, "zebra").is_empty()
    );
    assert!(
      search_positions(&all, "zebra")
        .is_empty()
    );
    assert_eq!(
      search_positions(&all, ""),
      vec![0, 1, 2]
    );
  }

  #[test]
  fn surrounding_whitespace_is_ignored()
   {
    let all = sample();

    assert_eq!(
      search_positions(&all, "  DOG "),
      vec![1]
    );
    assert!(
      search_positions(&all, " cat ")
        .is_empty()
    );
  }
}
