use std::{fs, path::Path};

use oxc::{
    allocator::{Allocator, Box},
    ast::{
        AstBuilder,
        ast::{
            self, BindingIdentifier, Declaration,
            ExportDefaultDeclarationKind, FormalParameterRest, Statement,
            TSImportEqualsDeclaration, TSModuleReference, TSTypeAnnotation,
            TSTypeParameterDeclaration, TSTypeParameterInstantiation,
        },
    },
    codegen::{Codegen, CodegenOptions},
    diagnostics::OxcDiagnostic,
    parser::Parser,
    semantic::SemanticBuilder,
    span::{SPAN, SourceType},
    transformer::{TransformOptions, Transformer},
};

use crate::bundler::{
    BundleOptions,
    result::{BundleError, Result},
};

/// Reads one TypeScript entry file and compiles it to a browser script.
pub fn transpile_entry(path: &Path, options: &BundleOptions) -> Result<String> {
    let source_text = fs::read_to_string(path)?;
    let source_type = SourceType::from_path(path).unwrap_or(SourceType::ts());
    transpile(&source_text, path, source_type, options)
}

pub fn transpile(
    source_text: &str,
    path: &Path,
    source_type: SourceType,
    options: &BundleOptions,
) -> Result<String> {
    let allocator = Allocator::default();
    let result = Parser::new(&allocator, source_text, source_type).parse();
    if !result.errors.is_empty() {
        return Err(BundleError::ParseErrors(result.errors));
    }
    let mut program = result.program;

    let semantic = SemanticBuilder::new()
        .with_check_syntax_error(true)
        .build(&program);
    if !semantic.errors.is_empty() {
        return Err(BundleError::SemanticErrors(semantic.errors));
    }

    // The TypeScript transform rewrites these into CommonJS, which has
    // nothing to bind to in a browser.
    let errors = unlinked_typescript_modules(&program);
    if !errors.is_empty() {
        return Err(BundleError::UnlinkedModule(errors));
    }

    let scopes = semantic.semantic.into_scoping();
    let transform_options = TransformOptions {
        typescript: oxc::transformer::TypeScriptOptions {
            // Imports only used as types are elided like tsc does.
            only_remove_type_imports: false,
            allow_namespaces: true,
            remove_class_fields_without_initializer: false,
            rewrite_import_extensions: None,
            ..Default::default()
        },
        ..Default::default()
    };
    let transformed = Transformer::new(&allocator, path, &transform_options)
        .build_with_scoping(scopes, &mut program);
    if !transformed.errors.is_empty() {
        return Err(BundleError::TransformErrors(transformed.errors));
    }

    let ast = AstBuilder::new(&allocator);
    let default_name = unused_name(source_text, "_default");
    let errors = remove_module_syntax(ast, &mut program, &default_name);
    if !errors.is_empty() {
        return Err(BundleError::UnlinkedModule(errors));
    }
    wrap_iife(ast, &mut program);

    let codegen = Codegen::new()
        .with_options(CodegenOptions {
            minify: options.minify,
            ..CodegenOptions::default()
        })
        .build(&program);
    Ok(codegen.code)
}

fn unlinked_typescript_modules(
    program: &ast::Program<'_>,
) -> Vec<OxcDiagnostic> {
    program
        .body
        .iter()
        .filter_map(|statement| match statement {
            Statement::TSImportEqualsDeclaration(declaration) => {
                require_import(declaration)
            }
            Statement::ExportNamedDeclaration(export) => {
                match &export.declaration {
                    Some(Declaration::TSImportEqualsDeclaration(
                        declaration,
                    )) => require_import(declaration),
                    _ => None,
                }
            }
            Statement::TSExportAssignment(assignment) => Some(
                OxcDiagnostic::error(
                    "cannot use `export =` in a self-contained script",
                )
                .with_label(assignment.span),
            ),
            _ => None,
        })
        .collect()
}

/// `import x = require("...")`. Aliases of namespaces are plain bindings
/// and pass through.
fn require_import(
    declaration: &TSImportEqualsDeclaration<'_>,
) -> Option<OxcDiagnostic> {
    let TSModuleReference::ExternalModuleReference(reference) =
        &declaration.module_reference
    else {
        return None;
    };
    if declaration.import_kind.is_type() {
        return None;
    }
    Some(
        OxcDiagnostic::error(format!(
            "cannot require {:?} into a self-contained script",
            reference.expression.value.as_str()
        ))
        .with_label(declaration.span),
    )
}

/// `base`, or `base` with the smallest numeric suffix, that does not occur
/// anywhere in the source text.
fn unused_name(source_text: &str, base: &str) -> String {
    if !source_text.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|suffix| format!("{}{}", base, suffix))
        .find(|name| !source_text.contains(name.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Turns exported declarations into plain ones and drops local export
/// lists. Imports and re-exports remain errors, since nothing is linked.
/// An anonymous default function or class is bound to `default_name`.
fn remove_module_syntax<'a>(
    ast: AstBuilder<'a>,
    program: &mut ast::Program<'a>,
    default_name: &str,
) -> Vec<OxcDiagnostic> {
    let default_binding = || -> BindingIdentifier<'a> {
        let name: &'a str = ast.allocator.alloc_str(default_name);
        ast.binding_identifier(SPAN, name)
    };
    let mut errors = Vec::new();
    let statements = std::mem::replace(&mut program.body, ast.vec());

    for statement in statements {
        match statement {
            Statement::ImportDeclaration(import) => {
                errors.push(
                    OxcDiagnostic::error(format!(
                        "cannot import {:?} into a self-contained script",
                        import.source.value.as_str()
                    ))
                    .with_label(import.span),
                );
            }
            Statement::ExportAllDeclaration(export) => {
                errors.push(
                    OxcDiagnostic::error(format!(
                        "cannot re-export {:?} from a self-contained script",
                        export.source.value.as_str()
                    ))
                    .with_label(export.span),
                );
            }
            Statement::ExportNamedDeclaration(export) => {
                let export = export.unbox();
                if let Some(source) = &export.source {
                    errors.push(
                        OxcDiagnostic::error(format!(
                            "cannot re-export {:?} from a self-contained script",
                            source.value.as_str()
                        ))
                        .with_label(export.span),
                    );
                    continue;
                }
                match export.declaration {
                    Some(Declaration::VariableDeclaration(declaration)) => {
                        program
                            .body
                            .push(Statement::VariableDeclaration(declaration));
                    }
                    Some(Declaration::FunctionDeclaration(declaration)) => {
                        program
                            .body
                            .push(Statement::FunctionDeclaration(declaration));
                    }
                    Some(Declaration::ClassDeclaration(declaration)) => {
                        program
                            .body
                            .push(Statement::ClassDeclaration(declaration));
                    }
                    // Type-only declarations and `export { a, b }`.
                    _ => {}
                }
            }
            Statement::ExportDefaultDeclaration(export) => {
                match export.unbox().declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(
                        mut function,
                    ) => {
                        if function.id.is_none() {
                            function.id = Some(default_binding());
                        }
                        program
                            .body
                            .push(Statement::FunctionDeclaration(function));
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(
                        mut class,
                    ) => {
                        if class.id.is_none() {
                            class.id = Some(default_binding());
                        }
                        program.body.push(Statement::ClassDeclaration(class));
                    }
                    ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {}
                    expression => {
                        program.body.push(ast.statement_expression(
                            SPAN,
                            expression.into_expression(),
                        ));
                    }
                }
            }
            statement => program.body.push(statement),
        }
    }

    errors
}

/// Moves the whole program into the body of an immediately invoked arrow
/// function:
///
/// ```not_rust
/// (() => {
///     <directives>
///     <statements>
/// })();
/// ```
fn wrap_iife<'a>(ast: AstBuilder<'a>, program: &mut ast::Program<'a>) {
    let directives = std::mem::replace(&mut program.directives, ast.vec());
    let statements = std::mem::replace(&mut program.body, ast.vec());
    program.hashbang = None;

    let function_body = ast.function_body(SPAN, directives, statements);
    let call = ast.expression_call(
        SPAN,
        ast.expression_parenthesized(
            SPAN,
            ast.expression_arrow_function(
                SPAN,
                false,
                false,
                None::<TSTypeParameterDeclaration<'a>>,
                ast.formal_parameters::<Option<Box<'a, FormalParameterRest<'a>>>>(
                    SPAN,
                    ast::FormalParameterKind::ArrowFormalParameters,
                    ast.vec(),
                    None,
                ),
                None::<TSTypeAnnotation<'a>>,
                function_body,
            ),
        ),
        None::<TSTypeParameterInstantiation<'a>>,
        ast.vec(),
        false,
    );
    program.body.push(ast.statement_expression(SPAN, call));
}
