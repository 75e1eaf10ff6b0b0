//! Extract row-anchored embedded images from an XLSX package
//!
//! calamine only exposes the cell grid, so the photos are pulled straight
//! from the package: worksheet rels point at a drawing part, each drawing
//! anchor carries a 0-based `from` row and a `r:embed` relationship id, and
//! the drawing rels resolve that id to the `xl/media/*` payload.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use zip::result::ZipError;
use zip::ZipArchive;

const REL_TYPE_DRAWING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";

/// One embedded image, anchored to a worksheet row.
#[derive(Debug, Clone)]
pub struct RowImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// One entry of a `.rels` part, with its target already resolved against the
/// source part's directory.
#[derive(Debug, Clone)]
struct Relationship {
    type_uri: String,
    target: String,
}

fn content_type_for(part: &str) -> &'static str {
    match part.rsplit('.').next().unwrap_or_default() {
        ext if ext.eq_ignore_ascii_case("png") => "image/png",
        ext if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => "image/jpeg",
        ext if ext.eq_ignore_ascii_case("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Resolve a relationship target against the directory of its source part.
/// Handles `../` segments and package-absolute targets.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn read_part_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .with_context(|| format!("Failed to read package part {}", name))?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to open package part {}", name)),
    }
}

fn read_part_xml<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let Some(bytes) = read_part_bytes(archive, name)? else {
        return Ok(None);
    };
    let xml = String::from_utf8(bytes)
        .with_context(|| format!("Package part {} is not valid UTF-8", name))?;
    Ok(Some(xml))
}

/// Parse a `.rels` part into an id → relationship map.
fn parse_relationships(xml: &str, base_dir: &str) -> Result<HashMap<String, Relationship>> {
    let doc = roxmltree::Document::parse(xml).context("Failed to parse relationships XML")?;
    let mut rels = HashMap::new();
    for node in doc.descendants().filter(|n| n.tag_name().name() == "Relationship") {
        let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target")) else {
            continue;
        };
        rels.insert(
            id.to_string(),
            Relationship {
                type_uri: node.attribute("Type").unwrap_or_default().to_string(),
                target: resolve_target(base_dir, target),
            },
        );
    }
    Ok(rels)
}

/// Find the worksheet part for the requested sheet (first sheet when `None`).
fn worksheet_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet: Option<&str>,
) -> Result<Option<String>> {
    let Some(workbook_xml) = read_part_xml(archive, "xl/workbook.xml")? else {
        return Ok(None);
    };
    let doc = roxmltree::Document::parse(&workbook_xml).context("Failed to parse xl/workbook.xml")?;

    let mut rel_id = None;
    for node in doc.descendants().filter(|n| n.tag_name().name() == "sheet") {
        let matches = match sheet {
            Some(name) => node.attribute("name") == Some(name),
            None => true,
        };
        if matches {
            rel_id = node
                .attributes()
                .find(|a| a.name() == "id")
                .map(|a| a.value().to_string());
            break;
        }
    }
    let Some(rel_id) = rel_id else {
        return Ok(None);
    };

    let Some(rels_xml) = read_part_xml(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(None);
    };
    let rels = parse_relationships(&rels_xml, "xl")?;
    Ok(rels.get(&rel_id).map(|rel| rel.target.clone()))
}

/// Directory portion of a part path (`xl/worksheets/sheet1.xml` → `xl/worksheets`).
fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Rels part for a given part (`xl/drawings/drawing1.xml` →
/// `xl/drawings/_rels/drawing1.xml.rels`).
fn rels_for_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Extract images anchored to rows of the given sheet, keyed by the 1-based
/// worksheet row of the anchor. When several images share a row the last one
/// in drawing order wins.
pub fn extract_row_images_from<R: Read + Seek>(
    reader: R,
    sheet: Option<&str>,
) -> Result<HashMap<u32, RowImage>> {
    let mut archive = ZipArchive::new(reader).context("Failed to open workbook as ZIP package")?;
    let mut images = HashMap::new();

    let Some(sheet_part) = worksheet_part(&mut archive, sheet)? else {
        return Ok(images);
    };

    let Some(sheet_rels_xml) = read_part_xml(&mut archive, &rels_for_part(&sheet_part))? else {
        return Ok(images);
    };
    let sheet_rels = parse_relationships(&sheet_rels_xml, part_dir(&sheet_part))?;

    // A worksheet has at most one drawing relationship, identified by its
    // type URI; the target path can be named anything.
    let drawing_parts: Vec<&str> = sheet_rels
        .values()
        .filter(|rel| rel.type_uri.eq_ignore_ascii_case(REL_TYPE_DRAWING))
        .map(|rel| rel.target.as_str())
        .collect();

    for drawing_part in drawing_parts {
        let Some(drawing_xml) = read_part_xml(&mut archive, drawing_part)? else {
            continue;
        };
        let drawing_rels = match read_part_xml(&mut archive, &rels_for_part(drawing_part))? {
            Some(xml) => parse_relationships(&xml, part_dir(drawing_part))?,
            None => continue,
        };

        let doc = roxmltree::Document::parse(&drawing_xml)
            .with_context(|| format!("Failed to parse {}", drawing_part))?;

        // Absolute anchors have no row; only cell-anchored images map to a
        // roster entry.
        let mut anchored: Vec<(u32, String)> = Vec::new();
        for anchor in doc.descendants().filter(|n| {
            matches!(n.tag_name().name(), "twoCellAnchor" | "oneCellAnchor")
        }) {
            let from_row = anchor
                .children()
                .find(|n| n.tag_name().name() == "from")
                .and_then(|from| from.children().find(|n| n.tag_name().name() == "row"))
                .and_then(|row| row.text())
                .and_then(|text| text.trim().parse::<u32>().ok());
            let embed = anchor
                .descendants()
                .find(|n| n.tag_name().name() == "blip")
                .and_then(|blip| blip.attributes().find(|a| a.name() == "embed"))
                .map(|a| a.value().to_string());
            if let (Some(row), Some(rid)) = (from_row, embed) {
                anchored.push((row, rid));
            }
        }

        for (anchor_row, rid) in anchored {
            let Some(media_part) = drawing_rels.get(&rid).map(|rel| rel.target.as_str()) else {
                log::warn!("drawing anchor references unknown relationship {}", rid);
                continue;
            };
            let Some(bytes) = read_part_bytes(&mut archive, media_part)? else {
                log::warn!("drawing references missing media part {}", media_part);
                continue;
            };
            images.insert(
                anchor_row + 1,
                RowImage {
                    bytes,
                    content_type: content_type_for(media_part),
                },
            );
        }
    }

    Ok(images)
}

/// Open a workbook file and extract its row-anchored images.
pub fn extract_row_images<P: AsRef<Path>>(
    path: P,
    sheet: Option<&str>,
) -> Result<HashMap<u32, RowImage>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;
    extract_row_images_from(file, sheet)
}
