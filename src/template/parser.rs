use std::collections::HashMap;
use std::str::FromStr;

use crate::atom::{Atom, AtomId};
use crate::bond::Bond;
use crate::mol::MoleculeGraph;

use super::error::TemplateError;
use super::MoleculeTemplate;

const SECTIONS: &[&str] = &[
    "Coords",
    "Types",
    "Molecules",
    "Fragments",
    "Charges",
    "Diameters",
    "Masses",
    "Bonds",
    "Angles",
    "Dihedrals",
    "Impropers",
    "Special Bond Counts",
    "Special Bonds",
    "Shake Flags",
    "Shake Atoms",
    "Shake Bond Types",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Coords,
    Types,
    Bonds,
    Skipped,
}

#[derive(Default)]
struct Raw {
    title: String,
    bonding_atoms: Vec<AtomId>,
    edge_atoms: Vec<AtomId>,
    delete_atoms: Vec<AtomId>,
    atom_count: Option<usize>,
    bond_count: Option<usize>,
    coords: Option<HashMap<u32, [f64; 3]>>,
    coord_entries: usize,
    types: Option<Vec<(u32, String)>>,
    bonds: Option<Vec<(u32, u32, u32)>>,
}

pub fn parse_molecule_template(text: &str) -> Result<MoleculeTemplate, TemplateError> {
    let mut raw = Raw::default();
    let mut section = Section::Header;

    for (i, line) in text.lines().enumerate() {
        let number = i + 1;
        let trimmed = line.trim();
        // extracted partial templates open with their tag comments and
        // have no title line
        if i == 0 && !trimmed.starts_with('#') {
            raw.title = trimmed.to_string();
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            if section == Section::Header {
                read_tagged_comment(comment, number, &mut raw)?;
            }
            continue;
        }

        let content = strip_comment(trimmed);
        if content.is_empty() {
            continue;
        }

        if SECTIONS.contains(&content) {
            section = match content {
                "Coords" => {
                    raw.coords = Some(HashMap::new());
                    Section::Coords
                }
                "Types" => {
                    raw.types = Some(Vec::new());
                    Section::Types
                }
                "Bonds" => {
                    raw.bonds = Some(Vec::new());
                    Section::Bonds
                }
                _ => Section::Skipped,
            };
            continue;
        }

        let fields: Vec<&str> = content.split_whitespace().collect();
        match section {
            Section::Header => read_header_line(&fields, number, &mut raw)?,
            Section::Coords => {
                expect_fields(&fields, 4, number, "Coords")?;
                let id = field(fields[0], number, "atom id")?;
                let xyz = [
                    field(fields[1], number, "x coordinate")?,
                    field(fields[2], number, "y coordinate")?,
                    field(fields[3], number, "z coordinate")?,
                ];
                raw.coord_entries += 1;
                if let Some(coords) = raw.coords.as_mut() {
                    coords.insert(id, xyz);
                }
            }
            Section::Types => {
                expect_fields(&fields, 2, number, "Types")?;
                let id = field(fields[0], number, "atom id")?;
                if let Some(types) = raw.types.as_mut() {
                    types.push((id, fields[1].to_string()));
                }
            }
            Section::Bonds => {
                expect_fields(&fields, 4, number, "Bonds")?;
                let bond_type = field(fields[1], number, "bond type")?;
                let a = field(fields[2], number, "atom id")?;
                let b = field(fields[3], number, "atom id")?;
                if let Some(bonds) = raw.bonds.as_mut() {
                    bonds.push((bond_type, a, b));
                }
            }
            Section::Skipped => {}
        }
    }

    build(raw)
}

fn build(raw: Raw) -> Result<MoleculeTemplate, TemplateError> {
    let types = raw.types.ok_or(TemplateError::MissingSection("Types"))?;
    if let Some(expected) = raw.atom_count {
        check_count("Types", expected, types.len())?;
        if raw.coords.is_some() {
            check_count("Coords", expected, raw.coord_entries)?;
        }
    }

    let bonds = match (raw.bonds, raw.bond_count) {
        (Some(bonds), expected) => {
            if let Some(expected) = expected {
                check_count("Bonds", expected, bonds.len())?;
            }
            bonds
        }
        (None, Some(n)) if n > 0 => return Err(TemplateError::MissingSection("Bonds")),
        (None, _) => Vec::new(),
    };

    let coords = raw.coords.unwrap_or_default();
    let mut graph = MoleculeGraph::new();
    for (id, element_type) in types {
        let mut atom = Atom::new(id, element_type);
        if let Some(&xyz) = coords.get(&id) {
            atom = atom.with_coords(xyz);
        }
        graph.add_atom(atom)?;
    }
    for (bond_type, a, b) in bonds {
        graph.add_bond(AtomId(a), AtomId(b), Bond::typed(bond_type))?;
    }

    log::debug!(
        "read template {:?}: {} atoms, {} bonds",
        raw.title,
        graph.atom_count(),
        graph.bond_count()
    );

    Ok(MoleculeTemplate {
        title: raw.title,
        graph,
        bonding_atoms: raw.bonding_atoms,
        edge_atoms: raw.edge_atoms,
        delete_atoms: raw.delete_atoms,
    })
}

/// `# Bonding_Atoms 1 2`, `# Edge_Atoms ...` and `# Delete_Atoms ...`
/// lines carry id lists; other comments are ignored.
fn read_tagged_comment(comment: &str, line: usize, raw: &mut Raw) -> Result<(), TemplateError> {
    let mut fields = comment.split_whitespace();
    let target = match fields.next() {
        Some("Bonding_Atoms") => &mut raw.bonding_atoms,
        Some("Edge_Atoms") => &mut raw.edge_atoms,
        Some("Delete_Atoms") => &mut raw.delete_atoms,
        _ => return Ok(()),
    };
    for token in fields {
        target.push(AtomId(field(token, line, "atom id")?));
    }
    Ok(())
}

fn read_header_line(fields: &[&str], line: usize, raw: &mut Raw) -> Result<(), TemplateError> {
    match fields {
        [n, "atoms", ..] => raw.atom_count = Some(field(n, line, "atom count")?),
        [n, "bonds", ..] => raw.bond_count = Some(field(n, line, "bond count")?),
        _ => {}
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}

fn expect_fields(
    fields: &[&str],
    n: usize,
    line: usize,
    section: &str,
) -> Result<(), TemplateError> {
    if fields.len() < n {
        return Err(TemplateError::Parse {
            line,
            detail: format!(
                "{section} entry needs {n} fields, found {}",
                fields.len()
            ),
        });
    }
    Ok(())
}

fn field<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T, TemplateError> {
    token.parse().map_err(|_| TemplateError::Parse {
        line,
        detail: format!("invalid {what} {token:?}"),
    })
}

fn check_count(section: &'static str, expected: usize, found: usize) -> Result<(), TemplateError> {
    if expected != found {
        return Err(TemplateError::CountMismatch {
            section,
            expected,
            found,
        });
    }
    Ok(())
}
