//! Paths, operations and webhooks.

mod body;
mod params;
mod security;

use oasgen_core::utils::to_pascal_case;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};
use crate::ir::{Method, Operation, OperationId, Webhook};
use crate::resolve::ref_member;
use crate::router::{PathTemplate, RouteEntry};

use super::cursor::Cursor;
use super::{Analyzer, Stop};

/// A resolved path item and what it is reachable under.
pub(super) struct PathItem<'s> {
    /// `None` for webhooks.
    pub template: Option<PathTemplate>,
    /// Raw path, or the webhook name.
    pub label: String,
    pub cursor: Cursor<'s>,
}

impl<'s> Analyzer<'s> {
    pub(super) fn paths(&mut self, root: &Cursor<'s>) -> Result<(), Stop> {
        let Some(paths) = root.get("paths") else {
            return Ok(());
        };
        for (raw_path, key_span, item) in paths.members() {
            if raw_path.starts_with("x-") {
                continue;
            }
            self.check_cancelled()?;

            let template = PathTemplate::parse(raw_path).map_err(|e| {
                Diagnostic::new(DiagnosticKind::InvalidPathTemplate, key_span)
                    .message(format!("`{}`: {}", raw_path, e))
                    .at_pointer(item.key.pointer.clone())
            });
            let Some(template) = self.recover(template, raw_path)? else {
                continue;
            };
            let resolved = self.path_item(&item);
            let Some(cursor) = self.recover(resolved, raw_path)? else {
                continue;
            };

            let item = PathItem {
                template: Some(template),
                label: raw_path.to_string(),
                cursor,
            };
            self.path_item_operations(&item)?;
        }
        tracing::debug!(operations = self.operations.len(), "paths analyzed");
        Ok(())
    }

    pub(super) fn webhooks(&mut self, root: &Cursor<'s>) -> Result<(), Stop> {
        let Some(webhooks) = root.get("webhooks") else {
            return Ok(());
        };
        for (name, _, item) in webhooks.members() {
            if name.starts_with("x-") {
                continue;
            }
            self.check_cancelled()?;
            let resolved = self.path_item(&item);
            let Some(cursor) = self.recover(resolved, name)? else {
                continue;
            };

            let item = PathItem {
                template: None,
                label: name.to_string(),
                cursor,
            };
            let operations = self.path_item_operations(&item)?;
            if !operations.is_empty() {
                self.webhooks.push(Webhook {
                    name: self.config.naming.types.apply(name),
                    operations,
                });
            }
        }
        tracing::debug!(webhooks = self.webhooks.len(), "webhooks analyzed");
        Ok(())
    }

    /// Follow a `$ref` node to its final target; other nodes are returned
    /// as they are.
    pub(super) fn follow(&self, cursor: &Cursor<'s>) -> Result<Cursor<'s>, Diagnostic> {
        let Some((reference, span)) = ref_member(cursor.node, cursor.source) else {
            return Ok(cursor.clone());
        };
        let target = self.resolver.resolve(reference, span)?;
        Ok(Cursor::new(target.node, target.source, target.key))
    }

    fn path_item(&self, item: &Cursor<'s>) -> Result<Cursor<'s>, Diagnostic> {
        item.object("path item")?;
        let item = self.follow(item)?;
        item.object("path item")?;
        Ok(item)
    }

    /// Analyze every operation of a path item, in declaration order.
    fn path_item_operations(&mut self, item: &PathItem<'s>) -> Result<Vec<OperationId>, Stop> {
        let mut ids = Vec::new();
        for (name, key_span, op) in item.cursor.members() {
            let Some(method) = Method::ALL.into_iter().find(|m| m.key() == name) else {
                continue;
            };
            if let Some(template) = &item.template
                && !self.config.selects(template.raw(), method)
            {
                tracing::trace!(path = template.raw(), method = %method, "filtered out");
                continue;
            }
            self.check_cancelled()?;

            let checkpoint = self.arena.checkpoint();
            let result = self.operation(item, method, &op, key_span);
            let what = format!("{} {}", method, item.label);
            match self.recover(result, &what)? {
                Some(id) => ids.push(id),
                None => self.rollback(checkpoint),
            }
        }
        Ok(ids)
    }

    fn operation(
        &mut self,
        item: &PathItem<'s>,
        method: Method,
        op: &Cursor<'s>,
        key_span: Span,
    ) -> Result<OperationId, Diagnostic> {
        op.object("operation")?;
        let operation_id = op.str_field("operationId")?;
        if let Some(raw_id) = operation_id
            && let Some(first) = self.operation_ids.get(raw_id)
        {
            return Err(Diagnostic::new(
                DiagnosticKind::DuplicateOperationName,
                op.key_span("operationId"),
            )
            .message(raw_id)
            .related_to(*first, "first defined here")
            .at_pointer(op.key.child("operationId").pointer));
        }

        let base = match operation_id {
            Some(raw_id) => self.config.naming.types.apply(raw_id),
            None => synthesize_name(method, &item.label),
        };
        let name = self.operation_names.claim(&base);

        let operation = match self.build_operation(item, method, op, &name, operation_id) {
            Ok(operation) => operation,
            Err(diagnostic) => {
                self.operation_names.release(&name);
                return Err(diagnostic);
            }
        };

        let id = OperationId(self.operations.len() as u32);
        if let Some(template) = &operation.path {
            let entry = RouteEntry {
                template: template.clone(),
                method,
                operation: id,
                span: key_span,
            };
            if let Err(diagnostic) = self.routes.add(entry) {
                self.operation_names.release(&name);
                return Err(diagnostic);
            }
        }
        if let Some(raw_id) = operation_id {
            self.operation_ids
                .insert(raw_id.to_string(), op.key_span("operationId"));
        }

        tracing::trace!(operation = %name, method = %method, "operation analyzed");
        self.operations.push(operation);
        Ok(id)
    }

    fn build_operation(
        &mut self,
        item: &PathItem<'s>,
        method: Method,
        op: &Cursor<'s>,
        name: &str,
        operation_id: Option<&str>,
    ) -> Result<Operation, Diagnostic> {
        let params = self.parameters(item, op, name)?;
        let request_body = match op.get("requestBody") {
            Some(body) => Some(self.request_body(&body, name)?),
            None => None,
        };
        let responses = self.responses(op, name)?;
        let security = self.requirements(op)?;

        let mut tags = Vec::new();
        if let Some(list) = op.get("tags") {
            list.array("`tags`")?;
            for tag in list.items() {
                tags.push(tag.as_str("tag")?.to_string());
            }
        }

        Ok(Operation {
            name: name.to_string(),
            operation_id: operation_id.map(String::from),
            path: item.template.clone(),
            method,
            params,
            request_body,
            responses,
            security,
            group: op.str_field("x-ogen-operation-group")?.map(String::from),
            tags,
            summary: op.str_field("summary")?.map(String::from),
            description: op.str_field("description")?.map(String::from),
            deprecated: op.bool_field("deprecated")?.unwrap_or(false),
            location: self.location(op.span(), &op.key),
        })
    }
}

/// `GET /pets/{petId}` is `GetPetsPetId`.
fn synthesize_name(method: Method, label: &str) -> String {
    format!("{}{}", to_pascal_case(method.key()), to_pascal_case(label))
}
