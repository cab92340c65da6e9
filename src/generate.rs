//! Directory-level drivers: plain generation and inheritance generation.

use crate::config::Settings;
use crate::error::{DocError, Result};
use crate::inherit::{merge, AncestorResolver, ClassRegistry};
use crate::naming::Overrides;
use crate::parser::{self, file_stem};
use crate::render::markdown::{publish, render_raw};
use crate::render::Renderer;
use crate::sections::{split_classes, ClassDocument};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const PACKAGE_INIT: &str = "__init__.py";

/// Render each of `files` and write `<stem>.<ext>` into `output_dir`.
///
/// Every input is checked to exist before anything is written.
pub fn generate(
    files: &[PathBuf],
    output_dir: &Path,
    renderer: &dyn Renderer,
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    if let Some(missing) = files.iter().find(|f| !f.is_file()) {
        return Err(DocError::MissingFile(missing.clone()));
    }
    fs::create_dir_all(output_dir).map_err(|e| DocError::io(output_dir, e))?;

    let mut written = Vec::new();
    for path in files {
        let content = read(path)?;
        let module = parser::parse_file(path, &content, settings)?;
        let output = renderer.render(&module, settings)?;
        let out_path = output_dir.join(format!("{}.{}", module.stem, renderer.file_extension()));
        write(&out_path, &output)?;
        written.push(out_path);
    }
    info!("wrote {} document(s) to {}", written.len(), output_dir.display());
    Ok(written)
}

/// `.py` files directly inside `dir`, sorted, without `__init__.py`.
///
/// `excludes` drops file names; a non-empty `includes` keeps only those.
pub fn python_files(dir: &Path, excludes: &[String], includes: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DocError::NotADirectory(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|e| DocError::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "py"))
        .filter(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            name != PACKAGE_INIT
                && !excludes.contains(&name)
                && (includes.is_empty() || includes.contains(&name))
        })
        .collect();
    files.sort();
    Ok(files)
}

pub struct InheritOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub overrides: Overrides,
    pub excludes: Vec<String>,
    pub includes: Vec<String>,
}

/// Generate inheritance-merged Markdown for a package directory.
///
/// Every selected file is first rendered on its own and written. Then the
/// class named after each file absorbs the documents of its ancestors; the
/// ancestor walk stops at the first ancestor without a document on disk.
/// Merged documents are written only after every merge is computed, so
/// merges always see un-inherited ancestors.
pub fn inherit_directory(opts: &InheritOptions, settings: &Settings) -> Result<Vec<PathBuf>> {
    let files = python_files(&opts.input_dir, &opts.excludes, &opts.includes)?;
    fs::create_dir_all(&opts.output_dir).map_err(|e| DocError::io(&opts.output_dir, e))?;

    let mut registry = ClassRegistry::new();
    for path in python_files(&opts.input_dir, &[], &[])? {
        registry.register_source(&read(&path)?);
    }

    // Pass 1: un-inherited documents, kept raw in memory
    let mut raw: HashMap<String, Vec<(String, String)>> = HashMap::new();
    let mut written = Vec::new();
    for path in &files {
        let module = parser::parse_file(path, &read(path)?, settings)?;
        let classes = render_raw(&module);
        let out_path = markdown_path(&opts.output_dir, &module.stem);
        write(&out_path, &publish_all(&classes, settings))?;
        written.push(out_path);
        raw.insert(module.stem, classes);
    }

    // Pass 2: merge each file's main class with its ancestors
    let mut merged_docs: Vec<(PathBuf, String)> = Vec::new();
    for path in &files {
        let stem = file_stem(path);
        let class_name = opts.overrides.class_for_stem(&stem);
        let Some(classes) = raw.get(&stem) else {
            continue;
        };
        let Some(index) = classes.iter().position(|(name, _)| *name == class_name) else {
            warn!("{}: no class named {}, skipping inheritance", path.display(), class_name);
            continue;
        };
        if !registry.contains(&class_name) {
            continue;
        }

        let mut ancestor_docs = Vec::new();
        for ancestor in registry.ancestors(&class_name) {
            let ancestor_stem = opts.overrides.stem_for_class(&ancestor);
            let ancestor_path = markdown_path(&opts.output_dir, &ancestor_stem);
            if !ancestor_path.is_file() {
                debug!(
                    "{}: ancestor chain stops at {} ({} not found)",
                    class_name,
                    ancestor,
                    ancestor_path.display()
                );
                break;
            }
            match ancestor_document(&raw, &ancestor_stem, &ancestor, &ancestor_path)? {
                Some(doc) => ancestor_docs.push(doc),
                None => {
                    warn!(
                        "{} does not document class {}, ancestor chain of {} cut short",
                        ancestor_path.display(),
                        ancestor,
                        class_name
                    );
                    break;
                }
            }
        }
        if ancestor_docs.is_empty() {
            continue;
        }
        debug!("{}: merging {} ancestor(s)", class_name, ancestor_docs.len());

        let mut classes = classes.clone();
        classes[index].1 = merge(&classes[index].1, &ancestor_docs);
        merged_docs.push((
            markdown_path(&opts.output_dir, &stem),
            publish_all(&classes, settings),
        ));
    }

    for (out_path, doc) in &merged_docs {
        write(out_path, doc)?;
    }
    info!(
        "wrote {} document(s), {} with inheritance, to {}",
        written.len(),
        merged_docs.len(),
        opts.output_dir.display()
    );
    Ok(written)
}

/// Raw document of `class_name`, from memory when this run rendered it,
/// otherwise from the file already on disk.
fn ancestor_document(
    raw: &HashMap<String, Vec<(String, String)>>,
    stem: &str,
    class_name: &str,
    path: &Path,
) -> Result<Option<String>> {
    if let Some(classes) = raw.get(stem) {
        return Ok(classes
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, doc)| doc.clone()));
    }
    let text = read(path)?;
    Ok(split_classes(&text)
        .into_iter()
        .find(|doc| ClassDocument::parse(doc).class_name() == Some(class_name)))
}

fn publish_all(classes: &[(String, String)], settings: &Settings) -> String {
    classes
        .iter()
        .map(|(name, doc)| publish(name, doc, settings))
        .collect::<Vec<_>>()
        .join("\n")
}

fn markdown_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{}.md", stem))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| DocError::io(path, e))
}

fn write(path: &Path, content: &str) -> Result<()> {
    debug!("writing {}", path.display());
    fs::write(path, content).map_err(|e| DocError::io(path, e))
}
