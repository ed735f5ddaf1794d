//! Interactive blueprint collection
//!
//! Backs `module:advanced-blueprint` when no `--config` is given. The
//! collector asks for entities, their fields (inline field syntax), and
//! then walks every unordered entity pair once, with the lexicographically
//! smaller name first, so no pair can be entered twice or in reverse.
//! The chosen direction decides which side is stored as `entityA`.

use crate::field_spec::parse_fields;
use crate::{Blueprint, Entity, PermissionConfig, Relationship, RoleGrants};
use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult};
use std::io::{BufRead, Write};

// ============================================================================
// Prompter
// ============================================================================

/// Line-oriented question/answer channel
pub trait Prompter {
    /// Ask for free text; an empty answer yields the default when given
    fn input(&mut self, prompt: &str, default: Option<&str>) -> EngineResult<String>;

    /// Ask to pick one option; returns its index
    fn select(&mut self, prompt: &str, options: &[&str], default: usize) -> EngineResult<usize>;

    /// Ask a yes/no question
    fn confirm(&mut self, prompt: &str, default: bool) -> EngineResult<bool>;

    /// Show an informational line
    fn note(&mut self, message: &str) -> EngineResult<()>;
}

/// `Prompter` over any reader/writer pair; end of input cancels
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn read_answer(&mut self) -> EngineResult<String> {
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(EngineError::Cancelled);
        }
        Ok(line.trim().to_string())
    }
}

impl LinePrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompter on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> EngineResult<String> {
        match default {
            Some(d) => write!(self.writer, "{} [{}]: ", prompt, d)?,
            None => write!(self.writer, "{}: ", prompt)?,
        }
        let answer = self.read_answer()?;
        if answer.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(answer)
        }
    }

    fn select(&mut self, prompt: &str, options: &[&str], default: usize) -> EngineResult<usize> {
        loop {
            writeln!(self.writer, "{}", prompt)?;
            for (i, option) in options.iter().enumerate() {
                let marker = if i == default { "*" } else { " " };
                writeln!(self.writer, " {}{}) {}", marker, i + 1, option)?;
            }
            write!(self.writer, "Choice [{}]: ", default + 1)?;
            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(default);
            }
            if let Ok(n) = answer.parse::<usize>() {
                if (1..=options.len()).contains(&n) {
                    return Ok(n - 1);
                }
            }
            if let Some(i) = options.iter().position(|o| o.eq_ignore_ascii_case(&answer)) {
                return Ok(i);
            }
            writeln!(self.writer, "Invalid choice '{}'", answer)?;
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> EngineResult<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.writer, "{} [{}]: ", prompt, hint)?;
            match self.read_answer()?.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                other => writeln!(self.writer, "Please answer yes or no (got '{}')", other)?,
            }
        }
    }

    fn note(&mut self, message: &str) -> EngineResult<()> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Relationship choices offered for a pair `(a, b)` with `a < b`
pub const PAIR_CHOICES: &[&str] = &[
    "none",
    "one-to-one",
    "one-to-many",
    "many-to-one",
    "many-to-many",
];

/// Build a `Relationship` from a pair choice; `None` for "none"
pub fn relationship_for_choice(a: &str, b: &str, choice: usize) -> Option<Relationship> {
    match choice {
        1 => Some(Relationship::one_to_one(a, b)),
        2 => Some(Relationship::one_to_many(a, b)),
        3 => Some(Relationship::many_to_one(a, b)),
        4 => Some(Relationship::many_to_many(a, b)),
        _ => None,
    }
}

/// Every unordered pair of names once, smaller name first
pub fn entity_pairs(names: &[&str]) -> Vec<(String, String)> {
    let mut sorted: Vec<&str> = names.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let mut pairs = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            pairs.push((a.to_string(), b.to_string()));
        }
    }
    pairs
}

/// Collect a full blueprint by prompting
pub fn collect_blueprint<P: Prompter>(prompter: &mut P, module: &str) -> EngineResult<Blueprint> {
    let mut blueprint = Blueprint::new(naming::pascal(module));
    prompter.note(&format!("Designing module '{}'", blueprint.module))?;

    // Entities
    loop {
        let raw = prompter.input("Entity name (leave empty to finish)", None)?;
        if raw.is_empty() {
            if blueprint.entities.is_empty() {
                prompter.note("At least one entity is required")?;
                continue;
            }
            break;
        }
        let name = naming::pascal(&raw);
        if blueprint.entity(&name).is_some() {
            prompter.note(&format!("Entity '{}' already exists", name))?;
            continue;
        }
        blueprint.entities.push(collect_entity(prompter, &name)?);
    }

    // Relationships
    let names: Vec<&str> = blueprint.entity_names();
    let pairs = entity_pairs(&names);
    let mut relationships = Vec::new();
    for (a, b) in pairs {
        let choice = prompter.select(
            &format!("Relationship between {} and {}", a, b),
            PAIR_CHOICES,
            0,
        )?;
        if let Some(rel) = relationship_for_choice(&a, &b, choice) {
            relationships.push(rel);
        }
    }
    blueprint.relationships = relationships;

    // Permissions
    if prompter.confirm("Generate permissions?", true)? {
        let roles = prompter.input("Roles (comma separated)", Some("admin"))?;
        let roles: Vec<String> = roles
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
        blueprint.permissions =
            Some(PermissionConfig::new(blueprint.module_snake()).with_roles(RoleGrants::All(roles)));
    }

    blueprint.normalize();
    Ok(blueprint)
}

fn collect_entity<P: Prompter>(prompter: &mut P, name: &str) -> EngineResult<Entity> {
    let default_table = naming::table_name(name);
    let table = prompter.input(&format!("Table name for {}", name), Some(&default_table))?;

    let fields = loop {
        let spec = prompter.input(
            &format!("Fields for {} (name:type[:nullable][:unique],...)", name),
            None,
        )?;
        match parse_fields(&spec) {
            Ok(fields) => break fields,
            Err(e) => prompter.note(&e.to_string())?,
        }
    };

    let mut entity = Entity::new(name).with_table_name(table);
    entity.fields = fields;
    Ok(entity)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::Cardinality;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn prompter(script: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_entity_pairs_are_ordered_and_unique() {
        let pairs = entity_pairs(&["Warehouse", "Location", "Aisle"]);
        assert_eq!(
            pairs,
            vec![
                ("Aisle".to_string(), "Location".to_string()),
                ("Aisle".to_string(), "Warehouse".to_string()),
                ("Location".to_string(), "Warehouse".to_string()),
            ]
        );
    }

    #[test]
    fn test_many_to_one_choice_swaps_pair() {
        let rel = relationship_for_choice("Location", "Warehouse", 3).unwrap();
        assert_eq!(rel.entity_a, "Warehouse");
        assert_eq!(rel.entity_b, "Location");
        assert_eq!(rel.cardinality, Cardinality::OneToMany);
        assert!(relationship_for_choice("Location", "Warehouse", 0).is_none());
    }

    #[test]
    fn test_select_accepts_number_name_and_default() {
        let mut p = prompter("3\nmany-to-many\n\nbogus\n2\n");
        assert_eq!(p.select("?", PAIR_CHOICES, 0).unwrap(), 2);
        assert_eq!(p.select("?", PAIR_CHOICES, 0).unwrap(), 4);
        assert_eq!(p.select("?", PAIR_CHOICES, 0).unwrap(), 0);
        assert_eq!(p.select("?", PAIR_CHOICES, 0).unwrap(), 1);
    }

    #[test]
    fn test_end_of_input_cancels() {
        let mut p = prompter("");
        assert!(matches!(p.input("Name", None), Err(EngineError::Cancelled)));
    }

    #[test]
    fn test_collect_blueprint() {
        let script = [
            "Warehouse",                     // entity
            "",                              // default table
            "name:string,code:string:unique", // fields
            "location",                      // entity, normalized to Location
            "",                              // default table
            "bad:money",                     // rejected
            "code:string",                   // fields
            "",                              // finish
            "many-to-one",                   // Location vs Warehouse
            "y",                             // permissions
            "admin, manager",                // roles
        ]
        .join("\n")
            + "\n";
        let mut p = prompter(&script);
        let blueprint = collect_blueprint(&mut p, "inventory").unwrap();

        assert_eq!(blueprint.module, "Inventory");
        assert_eq!(blueprint.entity_names(), vec!["Warehouse", "Location"]);
        assert_eq!(blueprint.entities[1].table_name, "locations");
        assert_eq!(
            blueprint.relationships,
            vec![Relationship::one_to_many("Warehouse", "Location")]
        );
        let perms = blueprint.permissions.unwrap();
        assert_eq!(perms.prefix, "inventory");
        assert_eq!(perms.resources, vec!["warehouses", "locations"]);
        assert_eq!(perms.roles.roles(), vec!["admin", "manager"]);
    }
}
