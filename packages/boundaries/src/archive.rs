//! Zipped shapefile loading.
//!
//! The `shapefile` reader works on paths, so the `.shp` and its companion
//! files are extracted into a temporary directory first. Archive paths are
//! flattened, so a shapefile nested in a folder loads the same way as one
//! at the archive root.
//!
//! Attribute text is decoded with the code page named by the `.cpg` file
//! when it is one we recognize, and otherwise with the language driver
//! byte in the `.dbf` header. Municipality files are commonly Windows-1252.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use climate_map_boundaries_models::{BoundaryOptions, BoundarySet, PolygonFeature};
use climate_map_dataset::canonicalize;
use dbase::encoding::LossyCodePage;
use dbase::yore::code_pages::CP1252;
use dbase::{FieldValue, Record, UnicodeLossy};
use shapefile::ShapeReader;
use zip::ZipArchive;

use crate::GeometrySourceError;
use crate::shape::{shape_kind, to_multipolygon};
use crate::simplify::simplify_all;

/// Companion files copied next to the `.shp`; `dbf` is required.
const SIDECARS: &[&str] = &["shx", "dbf", "prj", "cpg"];

/// Stem used for the extracted files.
const EXTRACTED_STEM: &str = "layer";

/// Loads and simplifies municipality polygons from zipped shapefile bytes.
///
/// # Errors
///
/// * [`GeometrySourceError::Archive`] if the bytes are not a zip archive
/// * [`GeometrySourceError::NoShapefile`] if no `.shp` entry exists
/// * [`GeometrySourceError::MissingSidecar`] if the `.dbf` is missing
/// * [`GeometrySourceError::MissingAttribute`] if the name field is not a
///   text attribute
/// * [`GeometrySourceError::Shapefile`] or [`GeometrySourceError::Io`] on
///   read failures
pub fn load_boundary_archive(
    bytes: &[u8],
    options: &BoundaryOptions,
) -> Result<BoundarySet, GeometrySourceError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let shp_name = find_shapefile(&archive)?;
    log::info!("Reading boundaries from archive entry {shp_name}");

    let dir = tempfile::tempdir()?;
    extract_shapefile_set(&mut archive, &shp_name, dir.path())?;

    let mut reader = open_reader(dir.path())?;

    let mut names = Vec::new();
    let mut geometries = Vec::new();
    let mut skipped = 0_usize;

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;
        let name = name_attribute(&record, &options.name_field)?;

        let Some(geometry) = to_multipolygon(&shape) else {
            skipped += 1;
            log::warn!("Skipping {} shape for {name:?}", shape_kind(&shape));
            continue;
        };

        names.push(name);
        geometries.push(geometry);
    }

    simplify_all(&mut geometries, options.simplify_tolerance_m);

    let features: Vec<PolygonFeature> = names
        .into_iter()
        .zip(geometries)
        .map(|(name, geometry)| PolygonFeature {
            key: canonicalize(&name),
            name,
            geometry,
            value: None,
        })
        .collect();

    log::info!(
        "Loaded {} boundary polygons ({skipped} non-polygon shapes skipped)",
        features.len()
    );

    Ok(BoundarySet::new(options.name_field.clone(), features))
}

/// Code pages a `.cpg` file can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodePage {
    Utf8,
    Windows1252,
}

impl CodePage {
    /// Parses `.cpg` contents such as `UTF-8`, `1252` or `ISO-8859-1`.
    fn from_cpg(contents: &str) -> Option<Self> {
        let label: String = contents
            .trim()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match label.as_str() {
            "UTF8" => Some(Self::Utf8),
            // Latin-1 text decodes identically under 1252 for printable chars
            "1252" | "CP1252" | "WINDOWS1252" | "ANSI1252" | "88591" | "ISO88591" | "LATIN1" => {
                Some(Self::Windows1252)
            }
            _ => None,
        }
    }
}

fn open_reader(
    dir: &Path,
) -> Result<shapefile::Reader<BufReader<File>, BufReader<File>>, GeometrySourceError> {
    let shapes = ShapeReader::from_path(dir.join(format!("{EXTRACTED_STEM}.shp")))?;
    let dbf_path = dir.join(format!("{EXTRACTED_STEM}.dbf"));
    let cpg_path = dir.join(format!("{EXTRACTED_STEM}.cpg"));

    let code_page = if cpg_path.exists() {
        let contents = std::fs::read_to_string(&cpg_path)?;
        let code_page = CodePage::from_cpg(&contents);
        if code_page.is_none() {
            log::warn!(
                "Unrecognized .cpg code page {:?}, using the .dbf header",
                contents.trim()
            );
        }
        code_page
    } else {
        None
    };
    log::debug!("Attribute code page: {code_page:?}");

    let records = match code_page {
        Some(CodePage::Utf8) => dbase::Reader::from_path_with_encoding(&dbf_path, UnicodeLossy),
        Some(CodePage::Windows1252) => {
            dbase::Reader::from_path_with_encoding(&dbf_path, LossyCodePage(CP1252))
        }
        None => dbase::Reader::from_path(&dbf_path),
    }
    .map_err(shapefile::Error::from)?;

    Ok(shapefile::Reader::new(shapes, records))
}

/// Finds the first `.shp` entry in sorted path order, ignoring macOS
/// resource-fork entries.
fn find_shapefile<R: Read + Seek>(archive: &ZipArchive<R>) -> Result<String, GeometrySourceError> {
    let mut names: Vec<&str> = archive
        .file_names()
        .filter(|name| !is_resource_fork(name))
        .collect();
    names.sort_unstable();

    names
        .into_iter()
        .find(|name| has_extension(name, "shp"))
        .map(ToString::to_string)
        .ok_or(GeometrySourceError::NoShapefile)
}

fn extract_shapefile_set<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    shp_name: &str,
    dir: &Path,
) -> Result<(), GeometrySourceError> {
    let stem = &shp_name[..shp_name.len() - ".shp".len()];

    extract_entry(archive, shp_name, &dir.join(format!("{EXTRACTED_STEM}.shp")))?;

    for &extension in SIDECARS {
        let sidecar = archive
            .file_names()
            .find(|name| {
                name.len() == stem.len() + 1 + extension.len()
                    && name.starts_with(stem)
                    && has_extension(name, extension)
            })
            .map(ToString::to_string);

        match sidecar {
            Some(name) => {
                extract_entry(archive, &name, &dir.join(format!("{EXTRACTED_STEM}.{extension}")))?;
            }
            None if extension == "dbf" => {
                return Err(GeometrySourceError::MissingSidecar {
                    shapefile: shp_name.to_string(),
                    extension,
                });
            }
            None => log::debug!("No .{extension} next to {shp_name}"),
        }
    }

    Ok(())
}

fn extract_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    target: &Path,
) -> Result<(), GeometrySourceError> {
    let mut entry = archive.by_name(name)?;
    let mut file = File::create(target)?;
    std::io::copy(&mut entry, &mut file)?;
    Ok(())
}

fn name_attribute(record: &Record, field: &str) -> Result<String, GeometrySourceError> {
    match record.get(field) {
        Some(FieldValue::Character(value)) => {
            Ok(value.as_deref().map(str::trim).unwrap_or_default().to_string())
        }
        _ => Err(GeometrySourceError::MissingAttribute {
            field: field.to_string(),
        }),
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn is_resource_fork(name: &str) -> bool {
    name.starts_with("__MACOSX/")
        || Path::new(name)
            .file_name()
            .and_then(|f| f.to_str())
            .is_some_and(|f| f.starts_with("._"))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use dbase::TableWriterBuilder;
    use shapefile::{Point, Polygon, PolygonRing};
    use zip::write::SimpleFileOptions;

    use super::*;

    /// Writes a polygon shapefile with one square per name and zips its
    /// files under `folder/`.
    pub(crate) fn boundary_zip(folder: &str, squares: &[(&str, f64, f64)], with_dbf: bool) -> Vec<u8> {
        let mut files = write_shapefile(squares, TableWriterBuilder::new());
        if !with_dbf {
            files.retain(|(ext, _)| *ext != "dbf");
        }
        zip_files(folder, &files)
    }

    /// Writes `municipios.{shp,shx,dbf}` and returns `(extension, bytes)`
    /// pairs.
    fn write_shapefile(
        squares: &[(&str, f64, f64)],
        table: TableWriterBuilder,
    ) -> Vec<(&'static str, Vec<u8>)> {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("municipios.shp");

        let table = table.add_character_field("NM_MUN".try_into().unwrap(), 60);
        let mut writer = shapefile::Writer::from_path(&shp, table).unwrap();
        for &(name, x, y) in squares {
            let ring = vec![
                Point::new(x, y),
                Point::new(x, y + 0.1),
                Point::new(x + 0.1, y + 0.1),
                Point::new(x + 0.1, y),
                Point::new(x, y),
            ];
            let mut record = Record::default();
            record.insert(
                "NM_MUN".to_string(),
                FieldValue::Character(Some(name.to_string())),
            );
            writer
                .write_shape_and_record(&Polygon::new(PolygonRing::Outer(ring)), &record)
                .unwrap();
        }
        drop(writer);

        ["shp", "shx", "dbf"]
            .into_iter()
            .map(|ext| {
                let bytes = std::fs::read(dir.path().join(format!("municipios.{ext}"))).unwrap();
                (ext, bytes)
            })
            .collect()
    }

    fn zip_files(folder: &str, files: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            for (ext, content) in files {
                zip.start_file(format!("{folder}municipios.{ext}"), options).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    /// Byte offset of the language driver id in a `.dbf` header.
    const LDID_OFFSET: usize = 29;

    fn no_simplify() -> BoundaryOptions {
        BoundaryOptions {
            simplify_tolerance_m: 0.0,
            ..BoundaryOptions::default()
        }
    }

    #[test]
    fn loads_nested_shapefile() {
        let bytes = boundary_zip(
            "BR_Municipios/",
            &[("Santa Barbara do Para", -48.5, -1.5), ("Ananindeua", -48.4, -1.4)],
            true,
        );
        let set = load_boundary_archive(&bytes, &no_simplify()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.name_field(), "NM_MUN");
        assert_eq!(set.features()[0].name, "Santa Barbara do Para");
        assert_eq!(set.features()[0].key.as_str(), "SANTA BARBARA DO PARA");
        assert!(set.features().iter().all(|f| f.value.is_none()));
        assert_eq!(set.features()[1].geometry.0.len(), 1);
    }

    #[test]
    fn missing_dbf_is_reported() {
        let bytes = boundary_zip("", &[("Belém", -48.5, -1.5)], false);
        let err = load_boundary_archive(&bytes, &no_simplify()).unwrap_err();
        assert!(matches!(
            err,
            GeometrySourceError::MissingSidecar { extension: "dbf", .. }
        ));
    }

    #[test]
    fn unknown_name_field_is_reported() {
        let bytes = boundary_zip("", &[("Belém", -48.5, -1.5)], true);
        let options = BoundaryOptions {
            name_field: "NOME".to_string(),
            ..no_simplify()
        };
        let err = load_boundary_archive(&bytes, &options).unwrap_err();
        assert!(matches!(err, GeometrySourceError::MissingAttribute { field } if field == "NOME"));
    }

    #[test]
    fn archive_without_shapefile() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"nothing here").unwrap();
            zip.finish().unwrap();
        }
        let err = load_boundary_archive(&buf, &no_simplify()).unwrap_err();
        assert!(matches!(err, GeometrySourceError::NoShapefile));
    }

    #[test]
    fn garbage_bytes_are_an_archive_error() {
        let err = load_boundary_archive(b"not a zip", &no_simplify()).unwrap_err();
        assert!(matches!(err, GeometrySourceError::Archive(_)));
    }

    #[test]
    fn cpg_code_page_decodes_names() {
        let mut files = write_shapefile(
            &[("Belém", -48.5, -1.5), ("Marabá", -49.1, -5.4)],
            TableWriterBuilder::with_encoding(LossyCodePage(CP1252)),
        );
        // Header claims UTF-8; the .cpg wins.
        let dbf = files.iter_mut().find(|(ext, _)| *ext == "dbf").unwrap();
        dbf.1[LDID_OFFSET] = 0xF0;
        files.push(("cpg", b"1252\r\n".to_vec()));

        let set = load_boundary_archive(&zip_files("", &files), &no_simplify()).unwrap();
        assert_eq!(set.features()[0].name, "Belém");
        assert_eq!(set.features()[0].key.as_str(), "BELEM");
        assert_eq!(set.features()[1].key.as_str(), "MARABA");
    }

    #[test]
    fn header_code_page_is_used_without_cpg() {
        let files = write_shapefile(
            &[("Belém", -48.5, -1.5)],
            TableWriterBuilder::with_encoding(LossyCodePage(CP1252)),
        );
        let set = load_boundary_archive(&zip_files("", &files), &no_simplify()).unwrap();
        assert_eq!(set.features()[0].key.as_str(), "BELEM");
    }

    #[test]
    fn esri_ansi_driver_id_reads_as_1252() {
        let mut files = write_shapefile(
            &[("Belém", -48.5, -1.5)],
            TableWriterBuilder::with_encoding(LossyCodePage(CP1252)),
        );
        let dbf = files.iter_mut().find(|(ext, _)| *ext == "dbf").unwrap();
        dbf.1[LDID_OFFSET] = 0x57;
        let set = load_boundary_archive(&zip_files("", &files), &no_simplify()).unwrap();
        assert_eq!(set.features()[0].name, "Belém");
    }

    #[test]
    fn utf8_cpg_keeps_utf8_names() {
        let mut files = write_shapefile(&[("Santarém", -54.7, -2.4)], TableWriterBuilder::new());
        files.push(("cpg", b"UTF-8".to_vec()));
        let set = load_boundary_archive(&zip_files("", &files), &no_simplify()).unwrap();
        assert_eq!(set.features()[0].name, "Santarém");
        assert_eq!(set.features()[0].key.as_str(), "SANTAREM");
    }

    #[test]
    fn cpg_labels() {
        assert_eq!(CodePage::from_cpg("UTF-8\n"), Some(CodePage::Utf8));
        assert_eq!(CodePage::from_cpg("1252"), Some(CodePage::Windows1252));
        assert_eq!(CodePage::from_cpg(" ISO 8859-1 "), Some(CodePage::Windows1252));
        assert_eq!(CodePage::from_cpg("latin1"), Some(CodePage::Windows1252));
        assert_eq!(CodePage::from_cpg("GB2312"), None);
    }

    #[test]
    fn resource_forks_are_ignored() {
        assert!(is_resource_fork("__MACOSX/municipios.shp"));
        assert!(is_resource_fork("dir/._municipios.shp"));
        assert!(!is_resource_fork("dir/municipios.shp"));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(has_extension("MUNICIPIOS.SHP", "shp"));
        assert!(!has_extension("municipios.shp.xml", "shp"));
    }
}
