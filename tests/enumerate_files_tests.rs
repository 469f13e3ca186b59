use std::fs;
use std::path::PathBuf;

use validocu_engine::enumerate_files;

#[test]
fn enumerate_files_finds_nested_files_sorted() {
    let td = tempfile::tempdir().unwrap();
    let base = td.path();
    let dossier = base.join("dossier/cliente-01");
    fs::create_dir_all(&dossier).unwrap();
    fs::write(dossier.join("Escritura de Mutuo.pdf"), b"%PDF-1.4\n").unwrap();
    fs::write(dossier.join("CARNET_p1.png"), b"png").unwrap();

    let pattern = format!("{}/dossier/**/*", base.display());
    let files = enumerate_files(&pattern).expect("should find files");
    let files: Vec<PathBuf> = files.into_iter().map(|p| p.strip_prefix(base).unwrap().to_path_buf()).collect();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].to_string_lossy(), "dossier/cliente-01/CARNET_p1.png");
    assert_eq!(files[1].to_string_lossy(), "dossier/cliente-01/Escritura de Mutuo.pdf");
}

#[test]
fn enumerate_files_empty_returns_error() {
    let td = tempfile::tempdir().unwrap();
    let pattern = format!("{}/dossier/**/*.pdf", td.path().display());
    let err = enumerate_files(&pattern).err().expect("should be error");
    assert_eq!(format!("{}", err), "NoFilesFound");
}
