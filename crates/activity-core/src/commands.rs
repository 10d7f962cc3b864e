use anyhow::{Context, anyhow};
use tracing::{debug, info, instrument};

use crate::activity::{Activity, Color};
use crate::cli::{Command, Fields, Target};
use crate::config::Config;
use crate::render::Renderer;
use crate::search;
use crate::storage::KeyValueStore;
use crate::store::ActivityStore;

#[instrument(skip(store, cfg, renderer))]
pub fn dispatch<S: KeyValueStore>(
    store: &mut ActivityStore<S>,
    cfg: &Config,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::List { query, color } => cmd_list(store, renderer, &query.join(" "), color),
        Command::Add(fields) => cmd_add(store, cfg, fields),
        Command::Show { target } => cmd_show(store, renderer, target),
        Command::Edit { target, fields } => cmd_edit(store, target, fields),
        Command::Delete { target } => cmd_delete(store, target),
        Command::Colors => renderer.print_colors(),
    }
}

#[instrument(skip(store, renderer))]
fn cmd_list<S: KeyValueStore>(
    store: &ActivityStore<S>,
    renderer: &Renderer,
    query: &str,
    color: Option<Color>,
) -> anyhow::Result<()> {
    info!("command list");

    let activities = store.load_all()?;
    let rows: Vec<(usize, &Activity)> = search::search_positions(&activities, query)
        .into_iter()
        .map(|idx| (idx, &activities[idx]))
        .filter(|(_, activity)| color.is_none_or(|c| activity.parsed_color() == Some(c)))
        .collect();

    debug!(total = activities.len(), shown = rows.len(), "filtered activities");
    if rows.is_empty() {
        println!("No activities.");
        return Ok(());
    }

    renderer.print_activity_table(&rows)
}

#[instrument(skip(store, cfg, fields))]
fn cmd_add<S: KeyValueStore>(
    store: &mut ActivityStore<S>,
    cfg: &Config,
    fields: Fields,
) -> anyhow::Result<()> {
    info!("command add");

    let color = match fields.color {
        Some(color) => color,
        None => cfg.default_color()?,
    };
    let activity = Activity::new(
        fields.title.unwrap_or_default(),
        fields.description.unwrap_or_default(),
        color,
    );

    let activities = store.append(activity).context("failed to add activity")?;
    println!("Created activity {}.", activities.len());
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_show<S: KeyValueStore>(
    store: &ActivityStore<S>,
    renderer: &Renderer,
    target: Target,
) -> anyhow::Result<()> {
    info!("command show");

    let activities = store.load_all()?;
    let index = resolve(&activities, target)?;
    renderer.print_activity_info(index, &activities[index])
}

#[instrument(skip(store, fields))]
fn cmd_edit<S: KeyValueStore>(
    store: &mut ActivityStore<S>,
    target: Target,
    fields: Fields,
) -> anyhow::Result<()> {
    info!("command edit");

    if fields == Fields::default() {
        return Err(anyhow!("nothing to change; pass --title, --description or --color"));
    }

    let activities = store.load_all()?;
    let index = resolve(&activities, target)?;

    let mut edited = activities[index].clone();
    if let Some(title) = fields.title {
        edited.title = title;
    }
    if let Some(description) = fields.description {
        edited.description = description;
    }
    if let Some(color) = fields.color {
        edited.color = color.as_str().to_string();
    }

    let result = match edited.id {
        Some(id) => store.replace(id, edited),
        None => store.replace_at(index, edited),
    };
    result.context("failed to edit activity")?;

    println!("Modified activity {}.", index + 1);
    Ok(())
}

#[instrument(skip(store))]
fn cmd_delete<S: KeyValueStore>(store: &mut ActivityStore<S>, target: Target) -> anyhow::Result<()> {
    info!("command delete");

    let activities = store.load_all()?;
    let index = resolve(&activities, target)?;
    let title = activities[index].title.clone();

    let result = match activities[index].id {
        Some(id) => store.remove(id),
        None => store.remove_at(index),
    };
    result.context("failed to delete activity")?;

    println!("Deleted activity {} '{}'.", index + 1, title);
    Ok(())
}

/// Zero-based index of `target` in `activities`.
fn resolve(activities: &[Activity], target: Target) -> anyhow::Result<usize> {
    match target {
        Target::Position(pos) => target
            .index()
            .filter(|index| *index < activities.len())
            .ok_or_else(|| {
                anyhow!(
                    "no activity at position {pos}; there are {}",
                    activities.len()
                )
            }),
        Target::Id(id) => activities
            .iter()
            .position(|activity| activity.id == Some(id))
            .ok_or_else(|| anyhow!("no activity with id {id}")),
    }
}
