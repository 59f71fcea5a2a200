use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::{
    error::CatalogError,
    models::{TemplateExercise, WorkoutTemplate},
};

/// Read-only source of workout templates.
pub trait TemplateRepository {
    fn lookup(&self, id: &str) -> Option<&WorkoutTemplate>;

    fn categories(&self) -> &[TemplateCategory];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCategory {
    pub name: String,
    #[serde(rename = "template", default)]
    pub templates: Vec<WorkoutTemplate>,
}

/// Templates grouped by category. Ids are unique across all categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    #[serde(rename = "category", default)]
    pub categories: Vec<TemplateCategory>,
}

static BUILTIN: Lazy<TemplateCatalog> = Lazy::new(|| TemplateCatalog {
    categories: vec![
        TemplateCategory {
            name: "barbell".into(),
            templates: vec![
                WorkoutTemplate::from_names("b1", "Day 1", ["Bench Press", "Squat", "Deadlift"]),
                WorkoutTemplate::from_names(
                    "b2",
                    "Day 2",
                    ["Incline Bench Press", "Front Squat", "Romanian Deadlift"],
                ),
                WorkoutTemplate::from_names("b3", "Day 3", ["Bench Press", "Squat", "Deadlift"]),
                WorkoutTemplate::from_names(
                    "b4",
                    "Day 4",
                    ["Incline Bench Press", "Front Squat", "Romanian Deadlift"],
                ),
            ],
        },
        TemplateCategory {
            name: "bodyweight".into(),
            templates: vec![
                WorkoutTemplate::from_names(
                    "bwA",
                    "Day A",
                    ["Pull Up", "Decline Push Up", "Bodyweight Row"],
                ),
                WorkoutTemplate::from_names(
                    "bwB",
                    "Day B",
                    ["Chin Up", "Tricep Dip", "Underhand Bodyweight Row"],
                ),
            ],
        },
    ],
});

impl TemplateRepository for TemplateCatalog {
    fn lookup(&self, id: &str) -> Option<&WorkoutTemplate> {
        self.categories
            .iter()
            .flat_map(|c| c.templates.iter())
            .find(|t| t.id == id)
    }

    fn categories(&self) -> &[TemplateCategory] {
        &self.categories
    }
}

impl TemplateCatalog {
    /// The catalog shipped with the binary.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: TemplateCatalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid template file: {}", path.display()))
    }

    pub fn category(&self, name: &str) -> Option<&TemplateCategory> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn templates(&self) -> impl Iterator<Item = &WorkoutTemplate> {
        self.categories.iter().flat_map(|c| c.templates.iter())
    }

    /// Merge `other` into `self` by category name. A template whose id is
    /// already present replaces the earlier definition wherever it lived.
    pub fn merge(&mut self, other: TemplateCatalog) {
        for incoming in other.categories {
            for category in &mut self.categories {
                category
                    .templates
                    .retain(|t| !incoming.templates.iter().any(|n| n.id == t.id));
            }

            debug!(
                "merging {} template(s) into category `{}`",
                incoming.templates.len(),
                incoming.name
            );

            match self
                .categories
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(&incoming.name))
            {
                Some(existing) => existing.templates.extend(incoming.templates),
                None => self.categories.push(incoming),
            }
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();

        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(CatalogError::EmptyCategory);
            }

            for template in &category.templates {
                if template.id.trim().is_empty() {
                    return Err(CatalogError::EmptyId(category.name.clone()));
                }
                if template.name.trim().is_empty() {
                    return Err(CatalogError::EmptyName(template.id.clone()));
                }
                if !seen.insert(template.id.as_str()) {
                    return Err(CatalogError::DuplicateId(template.id.clone()));
                }

                for exercise in &template.exercises {
                    validate_exercise(&template.id, exercise)?;
                }
            }
        }

        Ok(())
    }
}

fn validate_exercise(template: &str, ex: &TemplateExercise) -> Result<(), CatalogError> {
    let zero_target = ex.sets == Some(0) || ex.reps == Some(0);
    if ex.name.trim().is_empty() || zero_target {
        return Err(CatalogError::InvalidExercise {
            template: template.to_string(),
            exercise: ex.name.clone(),
        });
    }

    if ex.weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
        return Err(CatalogError::NegativeWeight {
            template: template.to_string(),
            exercise: ex.name.clone(),
        });
    }

    Ok(())
}

/// Return the id of the template closest to `input` (by id or name)
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
pub fn suggest_template<'a, R>(repo: &'a R, input: &str) -> Option<&'a str>
where
    R: TemplateRepository + ?Sized,
{
    let inp = input.to_ascii_lowercase();
    if inp.trim().is_empty() {
        return None;
    }

    // Best score per template, over its id and its name.
    let mut scores: Vec<(&str, f64)> = repo
        .categories()
        .iter()
        .flat_map(|c| c.templates.iter())
        .map(|t| {
            let by_id = jaro_winkler(&inp, &t.id.to_ascii_lowercase());
            let by_name = jaro_winkler(&inp, &t.name.to_ascii_lowercase());
            (t.id.as_str(), by_id.max(by_name))
        })
        .collect();

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best, best_score) = *scores.first()?;
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r#"
        [[category]]
        name = "custom"

        [[category.template]]
        id = "push"
        name = "Push Day"
        exercises = ["Bench Press", "Overhead Press"]

        [[category.template]]
        id = "legs"
        name = "Leg Day"

        [[category.template.exercises]]
        name = "Squat"
        sets = 5
        reps = 5
        weight = 100.0
        rest_seconds = 180
    "#;

    #[test]
    fn builtin_lookup_scans_every_category() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.lookup("b2").map(|t| t.name.as_str()), Some("Day 2"));
        assert_eq!(catalog.lookup("bwB").map(|t| t.name.as_str()), Some("Day B"));
        assert!(catalog.lookup("nope").is_none());
    }

    #[test]
    fn parses_names_and_detailed_exercises() {
        let catalog = TemplateCatalog::from_toml(FILE).unwrap();
        let push = catalog.lookup("push").unwrap();
        assert_eq!(
            push.exercise_names().collect::<Vec<_>>(),
            vec!["Bench Press", "Overhead Press"]
        );
        assert_eq!(push.exercises[0].sets, None);

        let squat = &catalog.lookup("legs").unwrap().exercises[0];
        assert_eq!(squat.sets, Some(5));
        assert_eq!(squat.weight, Some(100.0));
        assert_eq!(squat.rest_seconds, Some(180));
    }

    #[test]
    fn demo_file_is_valid() {
        let catalog = TemplateCatalog::from_toml(include_str!("../demos/templates.toml")).unwrap();
        assert_eq!(catalog.lookup("legs").unwrap().exercises.len(), 3);
        assert_eq!(catalog.lookup("push").unwrap().exercises[2].name, "Tricep Dip");
    }

    #[test]
    fn rejects_duplicate_ids_and_zero_sets() {
        let dup = r#"
            [[category]]
            name = "a"
            [[category.template]]
            id = "x"
            name = "One"
            exercises = ["Squat"]

            [[category]]
            name = "b"
            [[category.template]]
            id = "x"
            name = "Two"
            exercises = ["Squat"]
        "#;
        assert!(matches!(
            TemplateCatalog::from_toml(dup),
            Err(CatalogError::DuplicateId(id)) if id == "x"
        ));

        let zero = r#"
            [[category]]
            name = "a"
            [[category.template]]
            id = "x"
            name = "One"
            [[category.template.exercises]]
            name = "Squat"
            sets = 0
        "#;
        assert!(matches!(
            TemplateCatalog::from_toml(zero),
            Err(CatalogError::InvalidExercise { .. })
        ));
    }

    #[test]
    fn merge_replaces_by_id_and_appends_categories() {
        let mut catalog = TemplateCatalog::builtin();
        let extra = TemplateCatalog {
            categories: vec![
                TemplateCategory {
                    name: "Barbell".into(),
                    templates: vec![WorkoutTemplate::from_names("b1", "Heavy Day", ["Squat"])],
                },
                TemplateCategory {
                    name: "custom".into(),
                    templates: vec![WorkoutTemplate::from_names("c1", "Mine", ["Curl"])],
                },
            ],
        };
        catalog.merge(extra);

        assert_eq!(catalog.lookup("b1").unwrap().name, "Heavy Day");
        assert_eq!(catalog.templates().filter(|t| t.id == "b1").count(), 1);
        assert_eq!(catalog.category("barbell").unwrap().templates.len(), 4);
        assert!(catalog.lookup("c1").is_some());
    }

    #[test]
    fn suggests_close_template_ids() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(suggest_template(&catalog, "bwa"), Some("bwA"));
        assert_eq!(suggest_template(&catalog, "zzzzzz"), None);
        assert_eq!(suggest_template(&catalog, "   "), None);
    }
}
