//! PDF card renderer backed by lopdf.

use async_trait::async_trait;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;

use super::error::RenderError;
use super::overlay::OverlayLayout;
use super::qr::QrMatrix;
use super::text::FONT_NAME;
use super::traits::CardRenderer;
use super::types::{GeneratedDocument, QrGeometry, RenderJob, TextLayout};
use crate::config::ResolvedConfig;

/// XObject name under which the overlay is registered on the page.
const OVERLAY_NAME: &str = "AccreditOverlay";
/// Font resource name inside the overlay's own resources.
const OVERLAY_FONT: &str = "F1";
/// US Letter, used when a template page declares no media box.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];
/// Bound on the page tree walk for inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// Renders cards by stamping an overlay form onto the first page of a fresh
/// copy of the role template.
///
/// The overlay is a self-contained Form XObject drawn after the template's
/// own content, which is wrapped in a save/restore pair so template graphics
/// state never leaks into the overlay.
#[derive(Debug, Clone)]
pub struct PdfCardRenderer {
    layout: OverlayLayout,
}

impl PdfCardRenderer {
    pub fn new(qr: QrGeometry, text: TextLayout) -> Self {
        Self {
            layout: OverlayLayout::new(qr, text),
        }
    }

    /// Creates a renderer from resolved run settings.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.qr, config.text)
    }
}

#[async_trait]
impl CardRenderer for PdfCardRenderer {
    fn name(&self) -> &str {
        "pdf"
    }

    async fn render(&self, job: RenderJob) -> Result<GeneratedDocument, RenderError> {
        let layout = self.layout;
        tokio::task::spawn_blocking(move || render_card(&layout, job))
            .await
            .map_err(|e| RenderError::TaskFailed {
                reason: e.to_string(),
            })?
    }

    async fn validate(&self) -> Result<(), RenderError> {
        let qr = self.layout.qr();
        if !(qr.size > 0.0 && qr.x.is_finite() && qr.y.is_finite()) {
            return Err(RenderError::QrEncoding {
                reason: format!("invalid code placement {:?}", qr),
            });
        }
        QrMatrix::encode("0")?;
        Ok(())
    }
}

fn render_card(layout: &OverlayLayout, job: RenderJob) -> Result<GeneratedDocument, RenderError> {
    let start = Instant::now();
    let template = &job.template;

    let mut doc =
        Document::load(template).map_err(|e| RenderError::template_load(template, e))?;
    let page_id = doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| RenderError::EmptyTemplate {
            path: template.clone(),
        })?;

    let media_box = media_box(&doc, page_id);
    let operations = layout.operations(&job.record, (media_box[0], media_box[1]), OVERLAY_FONT)?;
    let overlay = Content { operations }.encode().map_err(RenderError::pdf)?;

    let existing = page_contents(&doc, page_id)?;
    let mut resources = match inherited(&doc, page_id, b"Resources") {
        Some(Object::Dictionary(resources)) => resources,
        _ => Dictionary::new(),
    };
    let mut xobjects = match resources.get(b"XObject").map(|o| resolve(&doc, o)) {
        Ok(Object::Dictionary(xobjects)) => xobjects.clone(),
        _ => Dictionary::new(),
    };
    let name = unique_name(&xobjects);

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => FONT_NAME,
        "Encoding" => "WinAnsiEncoding",
    });
    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => media_box.iter().map(|v| Object::from(*v)).collect::<Vec<_>>(),
            "Resources" => dictionary! {
                "Font" => dictionary! { OVERLAY_FONT => font_id },
            },
        },
        overlay,
    ));
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let draw_id = doc.add_object(Stream::new(
        Dictionary::new(),
        format!("Q\nq\n/{} Do\nQ\n", name).into_bytes(),
    ));

    xobjects.set(name, form_id);
    resources.set("XObject", xobjects);

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(draw_id));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(RenderError::pdf)?;
    page.set("Resources", resources);
    page.set("Contents", contents);

    doc.compress();
    let size_bytes = write_atomically(&mut doc, &job.output_path)?;

    tracing::debug!(
        "Rendered card for {} ({}) in {} ms",
        job.record.id,
        job.role,
        start.elapsed().as_millis()
    );

    Ok(GeneratedDocument {
        attendee_id: job.record.id,
        role: job.role,
        path: job.output_path,
        size_bytes,
    })
}

/// Saves next to `output_path` and renames into place.
fn write_atomically(doc: &mut Document, output_path: &Path) -> Result<u64, RenderError> {
    let output_error = |source: std::io::Error| RenderError::Output {
        path: output_path.to_path_buf(),
        source,
    };

    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(output_error)?;
    doc.save_to(&mut tmp).map_err(RenderError::pdf)?;
    tmp.as_file().sync_all().map_err(output_error)?;
    let file = tmp.persist(output_path).map_err(|e| output_error(e.error))?;

    Ok(file.metadata().map_err(output_error)?.len())
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Looks `key` up on the page, then up the page tree.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value).clone());
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let values: Option<Vec<f32>> = inherited(doc, page_id, b"MediaBox")
        .and_then(|o| o.as_array().ok().cloned())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| resolve(doc, item).as_float().ok())
                .collect()
        });

    match values.as_deref() {
        Some(&[llx, lly, urx, ury]) => [llx.min(urx), lly.min(ury), llx.max(urx), lly.max(ury)],
        _ => {
            tracing::debug!("Template page has no usable MediaBox, assuming US Letter");
            DEFAULT_MEDIA_BOX
        }
    }
}

/// The page's content streams as a flat list of references.
fn page_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, RenderError> {
    let page = doc.get_dictionary(page_id).map_err(RenderError::pdf)?;
    Ok(match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    })
}

fn unique_name(xobjects: &Dictionary) -> String {
    let mut name = OVERLAY_NAME.to_string();
    let mut n = 1;
    while xobjects.has(name.as_bytes()) {
        n += 1;
        name = format!("{}{}", OVERLAY_NAME, n);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::roster::AttendeeRecord;
    use crate::testing::fixtures::blank_template_pdf;
    use tempfile::TempDir;

    fn renderer() -> PdfCardRenderer {
        PdfCardRenderer::new(
            QrGeometry {
                x: 40.0,
                y: 40.0,
                size: 150.0,
            },
            TextLayout::default(),
        )
    }

    fn job(temp: &TempDir, template: &Path, id: &str) -> RenderJob {
        RenderJob {
            record: AttendeeRecord::new(2, id, "Ana", "Ruiz").with_company("Contoso"),
            role: Role::Speaker,
            template: template.to_path_buf(),
            output_path: temp.path().join(format!("attendee-{}.pdf", id)),
        }
    }

    fn overlay_text(doc: &Document, page_id: ObjectId) -> Vec<String> {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let form_id = xobjects
            .get(OVERLAY_NAME.as_bytes())
            .unwrap()
            .as_reference()
            .unwrap();
        let form = doc.get_object(form_id).unwrap().as_stream().unwrap();
        let content = Content::decode(&form.decompressed_content().unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .map(|op| String::from_utf8_lossy(op.operands[0].as_str().unwrap()).to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_render_stamps_overlay_on_template() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("template.pdf");
        blank_template_pdf(&template, 842.0, 595.0).unwrap();

        let doc = renderer()
            .render(job(&temp, &template, "20123456789"))
            .await
            .unwrap();
        assert_eq!(doc.attendee_id, "20123456789");
        assert_eq!(doc.role, Role::Speaker);
        assert!(doc.size_bytes > 0);
        assert_eq!(
            std::fs::metadata(&doc.path).unwrap().len(),
            doc.size_bytes
        );

        let output = Document::load(&doc.path).unwrap();
        let pages = output.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();

        // Template content kept, wrapped between save and draw streams
        let page = output.get_dictionary(page_id).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);

        assert_eq!(overlay_text(&output, page_id), vec!["ANA", "RUIZ", "CONTOSO"]);
    }

    #[test]
    fn test_media_box_inherited_from_page_tree() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("template.pdf");
        blank_template_pdf(&template, 300.0, 200.0).unwrap();

        let doc = Document::load(&template).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        assert_eq!(media_box(&doc, page_id), [0.0, 0.0, 300.0, 200.0]);
    }

    #[tokio::test]
    async fn test_render_is_repeatable() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("template.pdf");
        blank_template_pdf(&template, 612.0, 792.0).unwrap();

        let first = renderer().render(job(&temp, &template, "A1")).await.unwrap();
        let first_bytes = std::fs::read(&first.path).unwrap();
        let second = renderer().render(job(&temp, &template, "A1")).await.unwrap();
        let second_bytes = std::fs::read(&second.path).unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(first_bytes, second_bytes);
    }

    #[tokio::test]
    async fn test_unreadable_template_fails_without_output() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("broken.pdf");
        std::fs::write(&template, b"%PDF-1.4 garbage").unwrap();

        let job = job(&temp, &template, "A1");
        let output_path = job.output_path.clone();
        let err = renderer().render(job).await.unwrap_err();

        assert!(matches!(err, RenderError::TemplateLoad { .. }));
        assert_eq!(err.reason(), "template");
        assert!(!output_path.exists());
    }

    #[tokio::test]
    async fn test_missing_output_folder_fails() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("template.pdf");
        blank_template_pdf(&template, 612.0, 792.0).unwrap();

        let mut job = job(&temp, &template, "A1");
        job.output_path = temp.path().join("missing").join("attendee-A1.pdf");
        let err = renderer().render(job).await.unwrap_err();
        assert!(matches!(err, RenderError::Output { .. }));
    }

    #[tokio::test]
    async fn test_validate() {
        assert!(renderer().validate().await.is_ok());

        let bad = PdfCardRenderer::new(
            QrGeometry {
                x: 0.0,
                y: 0.0,
                size: 0.0,
            },
            TextLayout::default(),
        );
        assert!(bad.validate().await.is_err());
    }

    #[test]
    fn test_unique_name_avoids_existing_entries() {
        let mut xobjects = Dictionary::new();
        assert_eq!(unique_name(&xobjects), "AccreditOverlay");
        xobjects.set("AccreditOverlay", Object::Null);
        assert_eq!(unique_name(&xobjects), "AccreditOverlay2");
    }
}
