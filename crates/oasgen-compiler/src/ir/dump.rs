//! Deterministic text rendering of a sealed IR.
//!
//! Used by the CLI output and by snapshot tests. Types are listed in their
//! topological order; an edge is printed as the target's name, prefixed with
//! `*` when it is indirect.

use std::fmt::{self, Write as _};

use super::{
    BodyShape, Content, Discriminator, Ir, Operation, Parameter, ParameterContent, SchemeKind,
    Type, TypeKind, TypeRef, Validation,
};

pub fn dump(ir: &Ir) -> String {
    let mut out = String::new();
    write_ir(&mut out, ir).expect("String write never fails");
    out
}

fn write_ir(out: &mut String, ir: &Ir) -> fmt::Result {
    writeln!(out, "openapi {}", ir.spec_version)?;

    if !ir.types.is_empty() {
        writeln!(out, "\n[types]")?;
        let width = width_for_count(ir.types.len());
        for (i, ty) in ir.types.iter().enumerate() {
            write_type(out, ir, i, width, ty)?;
        }
    }

    if !ir.operations.is_empty() {
        writeln!(out, "\n[operations]")?;
        for op in &ir.operations {
            write_operation(out, ir, op)?;
        }
    }

    if !ir.webhooks.is_empty() {
        writeln!(out, "\n[webhooks]")?;
        for hook in &ir.webhooks {
            let ops: Vec<&str> = hook
                .operations
                .iter()
                .map(|id| ir.operation(*id).name.as_str())
                .collect();
            writeln!(out, "{} = {}", hook.name, ops.join(", "))?;
        }
    }

    let routes = ir.router.routes();
    if !routes.is_empty() {
        writeln!(out, "\n[routes]")?;
        for (method, template, op) in routes {
            writeln!(out, "{} {} -> {}", method, template, ir.operation(op).name)?;
        }
    }

    if !ir.security.is_empty() {
        writeln!(out, "\n[security]")?;
        for scheme in &ir.security.schemes {
            write!(out, "{} ({}) {}", scheme.name, scheme.key, scheme.kind.name())?;
            match &scheme.kind {
                SchemeKind::ApiKey { name, in_ } => write!(out, " {} in {}", name, in_.as_str())?,
                SchemeKind::Http {
                    scheme,
                    bearer_format,
                } => {
                    write!(out, " {}", scheme)?;
                    if let Some(format) = bearer_format {
                        write!(out, " ({})", format)?;
                    }
                }
                SchemeKind::OAuth2 { flows } => {
                    for flow in flows {
                        let scopes: Vec<&str> = flow.scopes.keys().map(String::as_str).collect();
                        write!(out, " {}[{}]", flow.kind.as_str(), scopes.join(","))?;
                    }
                }
                SchemeKind::OpenIdConnect { url } => write!(out, " {}", url)?,
                SchemeKind::MutualTls => {}
            }
            writeln!(out)?;
        }
    }

    if !ir.groups.is_empty() {
        writeln!(out, "\n[groups]")?;
        for group in &ir.groups {
            let ops: Vec<&str> = group
                .operations
                .iter()
                .map(|id| ir.operation(*id).name.as_str())
                .collect();
            writeln!(out, "{} = {}", group.name, ops.join(", "))?;
        }
    }

    let features: Vec<&str> = ir.features.iter().map(|f| f.as_str()).collect();
    let formats: Vec<&str> = ir.features.formats().collect();
    if !features.is_empty() || !formats.is_empty() {
        writeln!(out, "\n[features]")?;
        if !features.is_empty() {
            writeln!(out, "{}", features.join(" "))?;
        }
        if !formats.is_empty() {
            writeln!(out, "formats: {}", formats.join(" "))?;
        }
    }

    Ok(())
}

fn width_for_count(count: usize) -> usize {
    count.saturating_sub(1).to_string().len()
}

fn edge(ir: &Ir, r: TypeRef) -> String {
    let name = &ir.ty(r.id).name;
    if r.indirect {
        format!("*{}", name)
    } else {
        name.clone()
    }
}

fn write_type(out: &mut String, ir: &Ir, index: usize, width: usize, ty: &Type) -> fmt::Result {
    write!(out, "T{:0width$} {} = ", index, ty.name, width = width)?;
    match &ty.kind {
        TypeKind::Primitive {
            kind,
            format,
            validation,
        } => {
            write!(out, "{}", kind.name().to_ascii_lowercase())?;
            if let Some(format) = format {
                write!(out, " format={}", format.as_str())?;
            }
            write_validation(out, validation)?;
            writeln!(out)?;
        }
        TypeKind::Enum { base, values } => {
            writeln!(out, "enum {}", base.json_type().as_str())?;
            for value in values {
                writeln!(out, "    {} = {}", value.name, value.value)?;
            }
        }
        TypeKind::Array {
            element,
            min_items,
            max_items,
            unique,
        } => {
            write!(out, "[]{}", edge(ir, *element))?;
            if let Some(min) = min_items {
                write!(out, " minItems={}", min)?;
            }
            if let Some(max) = max_items {
                write!(out, " maxItems={}", max)?;
            }
            if *unique {
                write!(out, " unique")?;
            }
            writeln!(out)?;
        }
        TypeKind::Map {
            value,
            patterns,
            props,
            closed,
            key,
        } => {
            write!(out, "map")?;
            if let Some(props) = props {
                write!(out, " props={}", edge(ir, *props))?;
            }
            if let Some(value) = value {
                write!(out, " value={}", edge(ir, *value))?;
            }
            if *closed {
                write!(out, " closed")?;
            }
            if let Some(pattern) = &key.pattern {
                write!(out, " keyPattern={:?}", pattern)?;
            }
            if let Some(min) = key.min_properties {
                write!(out, " minProperties={}", min)?;
            }
            if let Some(max) = key.max_properties {
                write!(out, " maxProperties={}", max)?;
            }
            writeln!(out)?;
            for pattern in patterns {
                writeln!(out, "    /{}/: {}", pattern.pattern, edge(ir, pattern.value))?;
            }
        }
        TypeKind::Struct { fields, closed } => {
            writeln!(out, "struct{}", if *closed { " closed" } else { "" })?;
            for field in fields {
                write!(
                    out,
                    "    {} {:?}: {}",
                    field.target_name,
                    field.name,
                    edge(ir, field.ty)
                )?;
                if field.required {
                    write!(out, " required")?;
                }
                if let Some(default) = &field.default {
                    write!(out, " default={}", default)?;
                }
                for (k, v) in &field.extra_tags {
                    write!(out, " {}:{:?}", k, v)?;
                }
                writeln!(out)?;
            }
        }
        TypeKind::Sum {
            variants,
            discriminator,
        } => {
            match discriminator {
                Discriminator::Explicit { property } => {
                    writeln!(out, "sum {} {:?}", discriminator.name(), property)?
                }
                _ => writeln!(out, "sum {}", discriminator.name())?,
            }
            for variant in variants {
                write!(out, "    {}: {}", variant.name, edge(ir, variant.ty))?;
                if !variant.tags.is_empty() {
                    write!(out, " tags={:?}", variant.tags)?;
                }
                if !variant.unique_fields.is_empty() {
                    write!(out, " fields={:?}", variant.unique_fields)?;
                }
                if let Some(json_type) = variant.json_type {
                    write!(out, " type={}", json_type.as_str())?;
                }
                if let Some(content_type) = &variant.content_type {
                    write!(out, " content={}", content_type)?;
                }
                writeln!(out)?;
            }
        }
        TypeKind::Tuple { elements } => {
            let elements: Vec<String> = elements.iter().map(|e| edge(ir, *e)).collect();
            writeln!(out, "({})", elements.join(", "))?;
        }
        TypeKind::Alias { target } => writeln!(out, "alias {}", edge(ir, *target))?,
        TypeKind::Generic {
            optional,
            nullable,
            inner,
        } => {
            let prefix = match (optional, nullable) {
                (true, true) => "optional nullable",
                (true, false) => "optional",
                (false, true) => "nullable",
                (false, false) => "plain",
            };
            writeln!(out, "{} {}", prefix, edge(ir, *inner))?;
        }
        TypeKind::Any => writeln!(out, "any")?,
        TypeKind::Stream => writeln!(out, "stream")?,
    }
    Ok(())
}

fn write_validation(out: &mut String, v: &Validation) -> fmt::Result {
    if let Some(min) = v.min_length {
        write!(out, " minLength={}", min)?;
    }
    if let Some(max) = v.max_length {
        write!(out, " maxLength={}", max)?;
    }
    if let Some(pattern) = &v.pattern {
        write!(out, " pattern={:?}", pattern)?;
    }
    if let Some(min) = v.minimum {
        let op = if min.exclusive { ">" } else { ">=" };
        write!(out, " {}{}", op, min.value)?;
    }
    if let Some(max) = v.maximum {
        let op = if max.exclusive { "<" } else { "<=" };
        write!(out, " {}{}", op, max.value)?;
    }
    if let Some(of) = v.multiple_of {
        write!(out, " multipleOf={}", of)?;
    }
    for excluded in &v.excluded {
        write!(out, " !={}", excluded)?;
    }
    Ok(())
}

fn write_operation(out: &mut String, ir: &Ir, op: &Operation) -> fmt::Result {
    match &op.path {
        Some(path) => writeln!(out, "{} {} {}", op.name, op.method, path)?,
        None => writeln!(out, "{} {} (webhook)", op.name, op.method)?,
    }
    if let Some(group) = &op.group {
        writeln!(out, "  group {}", group)?;
    }
    if op.deprecated {
        writeln!(out, "  deprecated")?;
    }
    for param in &op.params {
        write_param(out, ir, "param", param)?;
    }
    if let Some(body) = &op.request_body {
        let shape = match body.shape {
            BodyShape::Single(_) => "single",
            BodyShape::Shared(_) => "shared",
            BodyShape::PerContent(_) => "per-content",
        };
        write!(out, "  request {} {}", shape, edge(ir, body.shape.ty()))?;
        writeln!(out, "{}", if body.required { " required" } else { "" })?;
        for content in &body.contents {
            write_content(out, ir, content)?;
        }
    }
    for response in op.responses.values() {
        write!(out, "  response {}", response.status)?;
        if let Some(shape) = response.shape {
            write!(out, " {}", edge(ir, shape.ty()))?;
        }
        writeln!(out)?;
        for header in &response.headers {
            write_param(out, ir, "  header", header)?;
        }
        for content in &response.contents {
            write_content(out, ir, content)?;
        }
    }
    for requirement in &op.security {
        let schemes: Vec<String> = requirement
            .schemes
            .iter()
            .map(|s| {
                if s.scopes.is_empty() {
                    s.scheme.clone()
                } else {
                    format!("{}[{}]", s.scheme, s.scopes.join(","))
                }
            })
            .collect();
        if schemes.is_empty() {
            writeln!(out, "  security anonymous")?;
        } else {
            writeln!(out, "  security {}", schemes.join(" + "))?;
        }
    }
    Ok(())
}

fn write_param(out: &mut String, ir: &Ir, label: &str, param: &Parameter) -> fmt::Result {
    write!(
        out,
        "  {} {} {:?} in {}",
        label,
        param.target_name,
        param.name,
        param.in_.as_str()
    )?;
    match &param.content {
        ParameterContent::Schema(ty) => {
            write!(out, " {}", param.style.as_str())?;
            if param.explode {
                write!(out, " explode")?;
            }
            write!(out, ": {}", edge(ir, *ty))?;
        }
        ParameterContent::Content { media, ty } => {
            write!(out, " content {}: {}", media, edge(ir, *ty))?;
        }
    }
    if param.required {
        write!(out, " required")?;
    }
    if param.allow_reserved {
        write!(out, " allowReserved")?;
    }
    writeln!(out)
}

fn write_content(out: &mut String, ir: &Ir, content: &Content) -> fmt::Result {
    writeln!(
        out,
        "    {} ({}): {}",
        content.media,
        content.kind.name(),
        edge(ir, content.ty)
    )?;
    for (field, encoding) in &content.encodings {
        write!(out, "      encoding {}", field)?;
        if let Some(content_type) = &encoding.content_type {
            write!(out, " contentType={}", content_type)?;
        }
        if let Some(style) = encoding.style {
            write!(out, " style={}", style.as_str())?;
        }
        if let Some(explode) = encoding.explode {
            write!(out, " explode={}", explode)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
