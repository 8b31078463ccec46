//! Code analysis service
//!
//! Runs the pattern analyzer over files or whole directory trees and keeps
//! the results in a caller-owned cache.

use anyhow::{Context, Result};
use ignore::gitignore::Gitignore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::analyzer;
use super::cache::ContextCache;
use super::model::CodeContextModel;

/// Default extensions treated as ABAP sources
pub const DEFAULT_EXTENSIONS: &[&str] = &["abap", "txt", "inc"];

/// Analyzes ABAP sources and caches the results by file name
pub struct CodeAnalysisService {
    cache: ContextCache,
    extensions: Vec<String>,
}

impl CodeAnalysisService {
    pub fn new(cache: ContextCache) -> Self {
        Self {
            cache,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the list of file extensions picked up by directory analysis
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.iter().map(|e| e.trim_start_matches('.').to_lowercase()).collect();
        self
    }

    /// Analyze source text and cache the result under `file_name`
    pub fn analyze(&mut self, file_name: &str, text: &str) -> CodeContextModel {
        let model = analyzer::analyze(file_name, text);
        self.cache.insert(model.clone());
        model
    }

    /// Read and analyze a single file
    pub fn analyze_file(&mut self, path: &Path) -> Result<CodeContextModel> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(self.analyze(&file_name, &content))
    }

    /// Analyze every ABAP source below `root`. Unreadable files are skipped.
    pub fn analyze_directory(&mut self, root: &Path) -> Result<Vec<CodeContextModel>> {
        let files = self.collect_files(root)?;
        let mut models = Vec::with_capacity(files.len());

        for file in &files {
            match self.analyze_file(file) {
                Ok(model) => models.push(model),
                Err(e) => warn!("Skipping {}: {:#}", file.display(), e),
            }
        }

        Ok(models)
    }

    /// Collect ABAP source files, honouring `.gitignore` and skipping hidden dirs
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Invalid path: {}", root.display()))?;

        let gitignore_path = root.join(".gitignore");
        let gitignore = if gitignore_path.exists() {
            Gitignore::new(&gitignore_path).0
        } else {
            Gitignore::empty()
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                if name.starts_with('.') {
                    return false;
                }
                !gitignore.matched(e.path(), e.file_type().is_dir()).is_ignore()
            })
        {
            let entry = entry?;
            if entry.file_type().is_file() && self.is_abap_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!("Found {} ABAP files under {}", files.len(), root.display());
        Ok(files)
    }

    pub fn is_abap_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// Detailed analysis of a cached file plus an overview of the cache
    pub fn enhanced_context(&self, file_name: &str) -> Option<String> {
        let model = self.cache.get(file_name)?;
        let mut out = model.ai_context();
        out.push_str("=== PROJECT CONTEXT ===\n");
        out.push_str(&format!("Analyzed files: {}\n", self.cache.len()));
        Some(out)
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ContextCache {
        &mut self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for CodeAnalysisService {
    fn default() -> Self {
        Self::new(ContextCache::unbounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ProgramType;

    #[test]
    fn test_analyze_caches_by_file_name() {
        let mut service = CodeAnalysisService::default();
        service.analyze("ZA.abap", "WRITE 'x'.");
        let model = service.analyze("ZA.abap", "REPORT za.");

        assert_eq!(model.program_type, ProgramType::Report);
        assert_eq!(service.cache().len(), 1);
        assert_eq!(
            service.cache().get("ZA.abap").map(|m| m.program_type),
            Some(ProgramType::Report)
        );

        service.clear_cache();
        assert!(service.cache().is_empty());
    }

    #[test]
    fn test_enhanced_context_requires_cached_file() {
        let mut service = CodeAnalysisService::default();
        assert!(service.enhanced_context("ZA.abap").is_none());

        service.analyze("ZA.abap", "REPORT za.\nDATA lv_a TYPE i.\nPERFORM run.");
        let ctx = service.enhanced_context("ZA.abap").unwrap();
        assert!(ctx.contains("Program type: REPORT"));
        assert!(ctx.contains("lv_a"));
        assert!(ctx.contains("run (kind: METHOD_CALL"));
        assert!(ctx.contains("Analyzed files: 1"));
    }

    #[test]
    fn test_analyze_directory_filters_extensions_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zmain.abap"), "REPORT zmain.\nINCLUDE ztop.").unwrap();
        fs::write(dir.path().join("ztop.inc"), "DATA gv_count TYPE i.").unwrap();
        fs::write(dir.path().join("notes.md"), "REPORT nope.").unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden").join("zsecret.abap"), "REPORT zsecret.").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("zclass.abap"), "CLASS zcl DEFINITION.").unwrap();

        let mut service = CodeAnalysisService::default();
        let models = service.analyze_directory(dir.path()).unwrap();

        let mut names: Vec<_> = models.iter().map(|m| m.file_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["zclass.abap", "zmain.abap", "ztop.inc"]);
        assert_eq!(service.cache().len(), 3);
    }

    #[test]
    fn test_custom_extensions() {
        let service = CodeAnalysisService::default().with_extensions(&[".prog".to_string()]);
        assert!(service.is_abap_file(Path::new("zfoo.PROG")));
        assert!(!service.is_abap_file(Path::new("zfoo.abap")));
    }
}
