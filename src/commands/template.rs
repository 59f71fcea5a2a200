use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    cli::TemplateCmd,
    models::WorkoutTemplate,
    templates::{TemplateCatalog, TemplateRepository, suggest_template},
    types::{OutputFmt, emit},
    utils::format_weight,
};

#[derive(Serialize)]
struct TemplateJson<'a> {
    category: &'a str,
    id: &'a str,
    name: &'a str,
    exercises: Vec<&'a str>,
}

pub fn handle(cmd: TemplateCmd, catalog: &TemplateCatalog, fmt: OutputFmt) -> Result<()> {
    match cmd {
        TemplateCmd::List { category } => {
            let categories: Vec<_> = match &category {
                Some(name) => match catalog.category(name) {
                    Some(c) => vec![c],
                    None => {
                        println!("{} no category named `{}`", "error:".red().bold(), name);
                        return Ok(());
                    }
                },
                None => catalog.categories().iter().collect(),
            };

            let rows: Vec<TemplateJson> = categories
                .iter()
                .flat_map(|&c| {
                    c.templates.iter().map(move |t| TemplateJson {
                        category: &c.name,
                        id: &t.id,
                        name: &t.name,
                        exercises: t.exercise_names().collect(),
                    })
                })
                .collect();

            emit(fmt, &rows, || {
                if rows.is_empty() {
                    println!("{}", "  (no templates found)".dimmed());
                    return;
                }

                let id_w = rows.iter().map(|r| r.id.len()).max().unwrap_or(1);
                for (category, group) in &rows.iter().chunk_by(|r| r.category) {
                    println!("{}", format!("{}:", category).cyan().bold());
                    for r in group {
                        println!(
                            "  {:<id_w$}  {} {}",
                            r.id.yellow(),
                            r.name.bold(),
                            format!("({})", r.exercises.iter().join(", ")).dimmed(),
                            id_w = id_w
                        );
                    }
                }
            })?;
        }

        TemplateCmd::Show { id } => match catalog.lookup(&id) {
            Some(template) => emit(fmt, template, || print_template(template))?,
            None => {
                println!("{} no template with id `{}`", "error:".red().bold(), id);
                if let Some(s) = suggest_template(catalog, &id) {
                    println!("  {} did you mean `{}`?", "hint:".blue().bold(), s);
                }
            }
        },

        TemplateCmd::Check { file } => check_file(&file)?,
    }

    Ok(())
}

fn print_template(template: &WorkoutTemplate) {
    println!("{} {}", template.name.bold(), format!("[{}]", template.id).dimmed());

    if template.exercises.is_empty() {
        println!("{}", "  (no exercises)".dimmed());
    }

    for (i, ex) in template.exercises.iter().enumerate() {
        let mut details = Vec::new();
        if let Some(sets) = ex.sets {
            details.push(format!("{} sets", sets));
        }
        if let Some(reps) = ex.reps {
            details.push(format!("{} reps", reps));
        }
        if let Some(w) = ex.weight {
            details.push(format!("{}kg", format_weight(w)));
        }
        if let Some(r) = ex.rest_seconds {
            details.push(format!("rest {}s", r));
        }

        let details = if details.is_empty() {
            String::new()
        } else {
            format!(" — {}", details.join(", "))
        };
        println!("{} • {}{}", format!("{}", i + 1).yellow(), ex.name, details.dimmed());
    }
}

fn check_file(path: &Path) -> Result<()> {
    match TemplateCatalog::load_file(path) {
        Ok(catalog) => {
            let count = catalog.templates().count();
            println!(
                "{} {} template(s) in {} categor{}",
                "ok:".green().bold(),
                count,
                catalog.categories.len(),
                if catalog.categories.len() == 1 { "y" } else { "ies" }
            );
            for t in catalog.templates().filter(|t| t.exercises.is_empty()) {
                println!(
                    "{} template `{}` has no exercises and cannot be started",
                    "warning:".yellow().bold(),
                    t.id
                );
            }
        }
        Err(e) => println!("{} {:#}", "error:".red().bold(), e),
    }
    Ok(())
}
