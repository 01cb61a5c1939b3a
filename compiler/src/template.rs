// template.rs — Splice generated fragments into a shader template
//
// The raymarcher's fragment shader carries one marker comment per variant.
// Each fragment is inserted on its own line directly above its marker, with
// the marker's indentation. Markers stay in place, so always splice into the
// pristine template; splicing a spliced result inserts twice.
//
// Failure modes: a template lacking any marker → `TemplateError::MissingMarker`.

use crate::codegen::{ShaderFragments, Variant};
use crate::error::TemplateError;

/// Insert each fragment of `fragments` before its marker line in `template`.
/// Empty fragments insert nothing.
pub fn splice(template: &str, fragments: &ShaderFragments) -> Result<String, TemplateError> {
    for variant in Variant::ALL {
        if !template.lines().any(|l| l.trim() == variant.marker()) {
            return Err(TemplateError::MissingMarker(variant.marker()));
        }
    }

    let mut out = String::with_capacity(template.len() + 256);
    for line in template.lines() {
        let trimmed = line.trim();
        if let Some(variant) = Variant::ALL.into_iter().find(|v| v.marker() == trimmed) {
            let fragment = fragments.get(variant);
            if !fragment.is_empty() {
                let indent = &line[..line.len() - line.trim_start().len()];
                out.push_str(indent);
                out.push_str(fragment);
                out.push('\n');
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    if !template.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::UniformLayout;

    fn fragments() -> ShaderFragments {
        ShaderFragments {
            surface: "s=A;".into(),
            sky: String::new(),
            lights: "l[0]=L;nl=1;".into(),
            uniforms: UniformLayout::new(),
        }
    }

    #[test]
    fn inserts_before_markers_with_indent() {
        let template = "void main() {\n    // !lights_inline\n  // !sky_inline\n\t// !sdf_inline\n}\n";
        let out = splice(template, &fragments()).unwrap();
        assert_eq!(
            out,
            "void main() {\n    l[0]=L;nl=1;\n    // !lights_inline\n  // !sky_inline\n\ts=A;\n\t// !sdf_inline\n}\n"
        );
    }

    #[test]
    fn missing_marker_is_reported() {
        let err = splice("// !sdf_inline\n// !sky_inline\n", &fragments()).unwrap_err();
        assert_eq!(err, TemplateError::MissingMarker("// !lights_inline"));
    }

    #[test]
    fn keeps_absent_trailing_newline() {
        let out = splice("// !sdf_inline\n// !sky_inline\n// !lights_inline", &fragments()).unwrap();
        assert!(out.ends_with("// !lights_inline"));
    }
}
