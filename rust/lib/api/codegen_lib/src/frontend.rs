/// Frontend scaffold generator: React + TypeScript + Vite + Tailwind.
///
/// Every entity gets a typed client module and a list view (which also
/// exports the detail view). Client paths come from the same naming rules as
/// the backend mounts.

use appgen_ir::{naming, Entity, Field, FieldType, PageKind, Schema, CLIENT_TYPES};
use serde_json::json;
use tracing::debug;

use crate::{CodeWriter, CodegenError, GeneratedCode, Result};

/// Prefix the dev server proxies to the backend.
pub const API_PREFIX: &str = "/api";

/// Backend address the dev server proxies to when `API_TARGET` is unset.
pub const BACKEND_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the proxy target, e.g. inside compose.
pub const API_TARGET_ENV: &str = "API_TARGET";

/// Dev server port.
pub const DEV_PORT: u16 = 3000;

pub struct FrontendGenerator;

impl crate::Codegen for FrontendGenerator {
    fn generate(&self, schema: &Schema) -> Result<GeneratedCode> {
        emit_frontend(schema)
    }

    fn language(&self) -> &str {
        "react-typescript"
    }
}

/// Emit the frontend tree for every entity in the schema.
pub fn emit_frontend(schema: &Schema) -> Result<GeneratedCode> {
    let mut code = GeneratedCode::new();

    code.push("package.json", package_json(schema)?);
    code.push("tsconfig.json", tsconfig_json()?);
    code.push("vite.config.ts", vite_config());
    code.push("tailwind.config.js", tailwind_config());
    code.push("postcss.config.js", postcss_config());
    code.push("index.html", index_html(schema));
    code.push("src/index.css", index_css());
    code.push("src/main.tsx", main_tsx());
    code.push("src/App.tsx", app_tsx(schema));

    for entity in &schema.entities {
        code.push(service_path(entity), service_ts(entity)?);
        code.push(page_path(entity), list_tsx(schema, entity)?);
        debug!(entity = %entity.name, path = %entity.route_path(), "emitted frontend entity");
    }

    Ok(code)
}

/// `src/services/<name>Service.ts`
pub fn service_path(entity: &Entity) -> String {
    format!("src/services/{}.ts", service_name(entity))
}

/// `src/pages/<Type>List.tsx`
pub fn page_path(entity: &Entity) -> String {
    format!("src/pages/{}List.tsx", entity.type_name())
}

fn service_name(entity: &Entity) -> String {
    format!("{}Service", naming::camel_name(&entity.name))
}

// ── TypeScript helpers ──

fn is_ts_ident(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Single-quoted JavaScript string literal.
fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Object key: bare when it is an identifier, quoted otherwise.
fn ts_key(name: &str) -> String {
    if is_ts_ident(name) {
        name.to_string()
    } else {
        js_str(name)
    }
}

/// Property access on `obj`.
fn ts_access(obj: &str, name: &str) -> String {
    if is_ts_ident(name) {
        format!("{obj}.{name}")
    } else {
        format!("{obj}[{}]", js_str(name))
    }
}

/// JSX text child; falls back to an expression when the text has markup characters.
fn jsx_text(s: &str) -> String {
    if s.contains(|c: char| matches!(c, '{' | '}' | '<' | '>' | '&' | '\n')) {
        format!("{{{}}}", js_str(s))
    } else {
        s.to_string()
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page_title(schema: &Schema, entity: &Entity, kind: PageKind) -> String {
    schema
        .page(&entity.name, kind)
        .and_then(|p| p.title.clone())
        .unwrap_or_else(|| entity.label().to_string())
}

fn render_json(path: &str, value: &serde_json::Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| CodegenError::Render {
        path: path.to_string(),
        source,
    })?;
    text.push('\n');
    Ok(text)
}

// ── Project files ──

fn package_json(schema: &Schema) -> Result<String> {
    let value = json!({
        "name": schema.slug(),
        "private": true,
        "version": schema.version,
        "description": schema.description.as_deref().unwrap_or(""),
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": "tsc && vite build",
            "preview": "vite preview"
        },
        "dependencies": {
            "@tanstack/react-query": "^5.51.0",
            "react": "^18.3.1",
            "react-dom": "^18.3.1",
            "react-router-dom": "^6.26.0"
        },
        "devDependencies": {
            "@types/react": "^18.3.3",
            "@types/react-dom": "^18.3.0",
            "@vitejs/plugin-react": "^4.3.1",
            "autoprefixer": "^10.4.20",
            "postcss": "^8.4.41",
            "tailwindcss": "^3.4.10",
            "typescript": "^5.5.4",
            "vite": "^5.4.0"
        }
    });
    render_json("package.json", &value)
}

fn tsconfig_json() -> Result<String> {
    let value = json!({
        "compilerOptions": {
            "target": "ES2020",
            "lib": ["ES2020", "DOM", "DOM.Iterable"],
            "module": "ESNext",
            "moduleResolution": "bundler",
            "jsx": "react-jsx",
            "strict": true,
            "noEmit": true,
            "isolatedModules": true,
            "skipLibCheck": true
        },
        "include": ["src"]
    });
    render_json("tsconfig.json", &value)
}

fn vite_config() -> String {
    let mut w = CodeWriter::with_indent("  ");
    w.line("import { defineConfig } from 'vite'");
    w.line("import react from '@vitejs/plugin-react'");
    w.blank();
    w.block("export default defineConfig({", "})", |w| {
        w.line("plugins: [react()],");
        w.block("server: {", "},", |w| {
            w.line(format!("port: {DEV_PORT},"));
            w.block("proxy: {", "},", |w| {
                w.block(format!("'{API_PREFIX}': {{"), "},", |w| {
                    w.line(format!("target: process.env.{API_TARGET_ENV} ?? '{BACKEND_URL}',"));
                    w.line("changeOrigin: true,");
                    w.line(format!(
                        "rewrite: (path) => path.replace(/^\\{API_PREFIX}/, ''),"
                    ));
                });
            });
        });
    });
    w.finish()
}

fn tailwind_config() -> String {
    let mut w = CodeWriter::with_indent("  ");
    w.line("/** @type {import('tailwindcss').Config} */");
    w.block("export default {", "}", |w| {
        w.line("content: ['./index.html', './src/**/*.{ts,tsx}'],");
        w.line("theme: { extend: {} },");
        w.line("plugins: [],");
    });
    w.finish()
}

fn postcss_config() -> String {
    let mut w = CodeWriter::with_indent("  ");
    w.block("export default {", "}", |w| {
        w.block("plugins: {", "},", |w| {
            w.line("tailwindcss: {},");
            w.line("autoprefixer: {},");
        });
    });
    w.finish()
}

fn index_html(schema: &Schema) -> String {
    let mut w = CodeWriter::with_indent("  ");
    w.line("<!doctype html>");
    w.block("<html lang=\"en\">", "</html>", |w| {
        w.block("<head>", "</head>", |w| {
            w.line("<meta charset=\"UTF-8\" />");
            w.line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />");
            w.line(format!("<title>{}</title>", html_escape(&schema.name)));
        });
        w.block("<body>", "</body>", |w| {
            w.line("<div id=\"root\"></div>");
            w.line("<script type=\"module\" src=\"/src/main.tsx\"></script>");
        });
    });
    w.finish()
}

fn index_css() -> String {
    let mut w = CodeWriter::with_indent("  ");
    w.lines(["@tailwind base;", "@tailwind components;", "@tailwind utilities;"]);
    w.blank();
    w.block("body {", "}", |w| {
        w.line("@apply bg-gray-50 text-gray-900 antialiased;");
    });
    w.finish()
}

fn main_tsx() -> String {
    let mut w = CodeWriter::with_indent("  ");
    w.line("import React from 'react'");
    w.line("import ReactDOM from 'react-dom/client'");
    w.line("import { QueryClient, QueryClientProvider } from '@tanstack/react-query'");
    w.line("import App from './App'");
    w.line("import './index.css'");
    w.blank();
    w.line("const queryClient = new QueryClient()");
    w.blank();
    w.line("ReactDOM.createRoot(document.getElementById('root')!).render(");
    w.indent();
    w.block("<React.StrictMode>", "</React.StrictMode>,", |w| {
        w.block("<QueryClientProvider client={queryClient}>", "</QueryClientProvider>", |w| {
            w.line("<App />");
        });
    });
    w.dedent();
    w.line(")");
    w.finish()
}

fn app_tsx(schema: &Schema) -> String {
    let mut w = CodeWriter::with_indent("  ");
    w.line("import { BrowserRouter, Link, Route, Routes } from 'react-router-dom'");
    for entity in &schema.entities {
        let ty = entity.type_name();
        w.line(format!(
            "import {ty}List, {{ {ty}Detail }} from './pages/{ty}List'"
        ));
    }
    w.blank();

    w.block("const entities = [", "]", |w| {
        for entity in &schema.entities {
            let description = schema
                .page(&entity.name, PageKind::List)
                .and_then(|p| p.description.clone())
                .unwrap_or_default();
            w.line(format!(
                "{{ path: {}, label: {}, description: {} }},",
                js_str(&entity.route_path()),
                js_str(entity.label()),
                js_str(&description)
            ));
        }
    });
    w.blank();

    w.block("function Home() {", "}", |w| {
        w.block("return (", ")", |w| {
            w.block("<div className=\"space-y-6\">", "</div>", |w| {
                w.line(format!(
                    "<h1 className=\"text-3xl font-bold text-gray-900\">{}</h1>",
                    jsx_text(&schema.name)
                ));
                if let Some(desc) = &schema.description {
                    w.line(format!(
                        "<p className=\"text-gray-600\">{}</p>",
                        jsx_text(desc)
                    ));
                }
                w.block(
                    "<div className=\"grid grid-cols-1 gap-4 sm:grid-cols-2 lg:grid-cols-3\">",
                    "</div>",
                    |w| {
                        w.block("{entities.map((entity) => (", "))}", |w| {
                            w.line("<Link");
                            w.indent()
                                .line("key={entity.path}")
                                .line("to={entity.path}")
                                .line("className=\"block rounded-lg bg-white p-6 shadow hover:shadow-md\"")
                                .dedent();
                            w.line(">");
                            w.indent()
                                .line("<h2 className=\"text-lg font-semibold text-gray-900\">{entity.label}</h2>")
                                .line("<p className=\"mt-1 text-sm text-gray-600\">{entity.description}</p>")
                                .dedent();
                            w.line("</Link>");
                        });
                    },
                );
            });
        });
    });
    w.blank();

    w.block("export default function App() {", "}", |w| {
        w.block("return (", ")", |w| {
            w.block("<BrowserRouter>", "</BrowserRouter>", |w| {
                w.block("<div className=\"min-h-screen\">", "</div>", |w| {
                    w.block("<nav className=\"bg-white shadow\">", "</nav>", |w| {
                        w.block(
                            "<div className=\"mx-auto flex max-w-7xl items-center space-x-6 px-4 py-4\">",
                            "</div>",
                            |w| {
                                w.line(format!(
                                    "<Link to=\"/\" className=\"text-xl font-bold text-gray-900\">{}</Link>",
                                    jsx_text(&schema.name)
                                ));
                                w.block("{entities.map((entity) => (", "))}", |w| {
                                    w.line("<Link key={entity.path} to={entity.path} className=\"text-gray-600 hover:text-gray-900\">");
                                    w.indent().line("{entity.label}").dedent();
                                    w.line("</Link>");
                                });
                            },
                        );
                    });
                    w.block("<main className=\"mx-auto max-w-7xl px-4 py-6\">", "</main>", |w| {
                        w.block("<Routes>", "</Routes>", |w| {
                            w.line("<Route path=\"/\" element={<Home />} />");
                            for entity in &schema.entities {
                                let ty = entity.type_name();
                                let path = entity.route_path();
                                w.line(format!(
                                    "<Route path=\"{path}\" element={{<{ty}List />}} />"
                                ));
                                w.line(format!(
                                    "<Route path=\"{path}/:id\" element={{<{ty}Detail />}} />"
                                ));
                            }
                        });
                    });
                });
            });
        });
    });
    w.finish()
}

// ── Per-entity files ──

fn service_ts(entity: &Entity) -> Result<String> {
    let ty = entity.type_name();
    let svc = service_name(entity);

    let mut w = CodeWriter::with_indent("  ");
    w.line(format!(
        "const BASE_URL = '{API_PREFIX}{}'",
        entity.route_path()
    ));
    w.blank();

    let mut members = Vec::new();
    for field in &entity.columns {
        let ts = CLIENT_TYPES.lookup(field.ty)?;
        members.push(if field.required {
            format!("{}: {ts}", ts_key(&field.name))
        } else {
            format!("{}?: {ts} | null", ts_key(&field.name))
        });
    }
    w.block(format!("export interface {ty} {{"), "}", |w| {
        w.lines(&members);
    });
    w.blank();
    w.line(format!(
        "export type {ty}Input = Omit<{ty}, 'id' | 'created_at' | 'updated_at'>"
    ));
    w.blank();

    w.block(
        "async function request<T>(path: string, init?: RequestInit): Promise<T> {",
        "}",
        |w| {
            w.block("const response = await fetch(`${BASE_URL}${path}`, {", "})", |w| {
                w.line("headers: { 'Content-Type': 'application/json' },");
                w.line("...init,");
            });
            w.block("if (!response.ok) {", "}", |w| {
                w.line("throw new Error(`${init?.method ?? 'GET'} ${BASE_URL}${path} failed: ${response.status}`)");
            });
            w.line("return response.json() as Promise<T>");
        },
    );
    w.blank();

    w.block(format!("export const {svc} = {{"), "}", |w| {
        w.line(format!(
            "list: (offset = 0, limit = 100) => request<{ty}[]>(`?offset=${{offset}}&limit=${{limit}}`),"
        ));
        w.line(format!(
            "get: (id: string) => request<{ty}>(`/${{id}}`),"
        ));
        w.line(format!(
            "create: (data: {ty}Input) => request<{ty}>('', {{ method: 'POST', body: JSON.stringify(data) }}),"
        ));
        w.line(format!(
            "update: (id: string, data: Partial<{ty}Input>) => request<{ty}>(`/${{id}}`, {{ method: 'PUT', body: JSON.stringify(data) }}),"
        ));
        w.line(
            "remove: (id: string) => request<{ message: string }>(`/${id}`, { method: 'DELETE' }),",
        );
    });
    Ok(w.finish())
}

const TH_CLASS: &str =
    "px-6 py-3 text-left text-xs font-medium uppercase tracking-wider text-gray-500";
const TD_CLASS: &str = "whitespace-nowrap px-6 py-4 text-sm text-gray-900";
const INPUT_CLASS: &str =
    "w-full rounded-md border border-gray-300 px-3 py-2 focus:ring-2 focus:ring-blue-500";
const LABEL_CLASS: &str = "mb-1 block text-sm font-medium text-gray-700";

fn list_tsx(schema: &Schema, entity: &Entity) -> Result<String> {
    // the interface comes from the client module; this just fails fast on unmapped types
    for field in &entity.columns {
        CLIENT_TYPES.lookup(field.ty)?;
    }

    let ty = entity.type_name();
    let svc = service_name(entity);
    let path = entity.route_path();
    let label = entity.label();
    let fields: Vec<&Field> = entity.user_fields().collect();
    let has_dates = fields.iter().any(|f| f.ty == FieldType::Date);

    let mut w = CodeWriter::with_indent("  ");
    w.line("import { useState, type FormEvent } from 'react'");
    w.line("import { Link, useParams } from 'react-router-dom'");
    w.line("import { useMutation, useQuery, useQueryClient } from '@tanstack/react-query'");
    w.line(format!(
        "import {{ {svc}, type {ty}, type {ty}Input }} from '../services/{svc}'"
    ));
    w.blank();
    w.line(format!("const QUERY_KEY = [{}]", js_str(&entity.route_segment())));
    w.blank();
    w.block("function formatValue(value: unknown): string {", "}", |w| {
        w.line("if (value === null || value === undefined) return ''");
        w.line("if (typeof value === 'boolean') return value ? 'Yes' : 'No'");
        w.line("return String(value)");
    });
    if has_dates {
        w.blank();
        w.block(
            "function toDateTimeInput(value: string | null | undefined): string {",
            "}",
            |w| {
                // datetime-local wants local wall-clock time, not UTC
                w.line("if (!value) return ''");
                w.line("const date = new Date(value)");
                w.line("if (Number.isNaN(date.getTime())) return ''");
                w.line("const local = new Date(date.getTime() - date.getTimezoneOffset() * 60000)");
                w.line("return local.toISOString().slice(0, 16)");
            },
        );
        w.blank();
        w.block("function fromDateTimeInput(value: string): string {", "}", |w| {
            w.line("return value ? new Date(value).toISOString() : ''");
        });
    }
    w.blank();

    // list view
    w.block(format!("export default function {ty}List() {{"), "}", |w| {
        w.line("const [search, setSearch] = useState('')");
        w.line(format!("const [editing, setEditing] = useState<{ty} | null>(null)"));
        w.line("const [showForm, setShowForm] = useState(false)");
        w.line("const queryClient = useQueryClient()");
        w.blank();
        w.block("const { data: items = [], isLoading, error } = useQuery({", "})", |w| {
            w.line("queryKey: QUERY_KEY,");
            w.line(format!("queryFn: () => {svc}.list(),"));
        });
        w.blank();
        w.block("const deleteMutation = useMutation({", "})", |w| {
            w.line(format!("mutationFn: {svc}.remove,"));
            w.line("onSuccess: () => queryClient.invalidateQueries({ queryKey: QUERY_KEY }),");
        });
        w.blank();
        w.line("const query = search.toLowerCase()");
        w.line("const filtered = items.filter((item) =>");
        w.indent()
            .line("Object.values(item).some((value) => String(value).toLowerCase().includes(query)),")
            .dedent();
        w.line(")");
        w.blank();
        w.block("const handleDelete = (id: string) => {", "}", |w| {
            w.block(
                format!(
                    "if (window.confirm({})) {{",
                    js_str(&format!("Delete this {label}?"))
                ),
                "}",
                |w| {
                    w.line("deleteMutation.mutate(id)");
                },
            );
        });
        w.blank();
        w.block(format!("const openForm = (item: {ty} | null) => {{"), "}", |w| {
            w.line("setEditing(item)");
            w.line("setShowForm(true)");
        });
        w.blank();
        w.block("const closeForm = () => {", "}", |w| {
            w.line("setEditing(null)");
            w.line("setShowForm(false)");
        });
        w.blank();
        w.line("if (isLoading) return <div className=\"py-8 text-center\">Loading...</div>");
        w.line(format!(
            "if (error) return <div className=\"py-8 text-center text-red-600\">{}</div>",
            jsx_text(&format!("Failed to load {label}"))
        ));
        w.blank();
        w.block("return (", ")", |w| {
            w.block("<div className=\"space-y-6\">", "</div>", |w| {
                w.block("<div className=\"flex items-center justify-between\">", "</div>", |w| {
                    w.block("<div>", "</div>", |w| {
                        w.line(format!(
                            "<h1 className=\"text-2xl font-bold text-gray-900\">{}</h1>",
                            jsx_text(&page_title(schema, entity, PageKind::List))
                        ));
                        w.line(format!(
                            "<p className=\"mt-1 text-sm text-gray-600\">{}</p>",
                            jsx_text(&format!("Manage all {label} records"))
                        ));
                    });
                    w.line("<button");
                    w.indent()
                        .line("onClick={() => openForm(null)}")
                        .line("className=\"rounded-md bg-blue-600 px-4 py-2 text-white hover:bg-blue-700\"")
                        .dedent();
                    w.line(">");
                    w.indent().line("New").dedent();
                    w.line("</button>");
                });
                w.blank();
                w.line("<input");
                w.indent()
                    .line("type=\"text\"")
                    .line("placeholder=\"Search...\"")
                    .line("value={search}")
                    .line("onChange={(e) => setSearch(e.target.value)}")
                    .line(format!("className=\"{INPUT_CLASS} max-w-md\""))
                    .dedent();
                w.line("/>");
                w.blank();
                w.block("<div className=\"overflow-hidden bg-white shadow sm:rounded-md\">", "</div>", |w| {
                    w.block("<table className=\"min-w-full divide-y divide-gray-200\">", "</table>", |w| {
                        w.block("<thead className=\"bg-gray-50\">", "</thead>", |w| {
                            w.block("<tr>", "</tr>", |w| {
                                for f in &fields {
                                    w.line(format!(
                                        "<th className=\"{TH_CLASS}\">{}</th>",
                                        jsx_text(&naming::title_case(&f.name))
                                    ));
                                }
                                w.line(format!("<th className=\"{TH_CLASS}\">Actions</th>"));
                            });
                        });
                        w.block("<tbody className=\"divide-y divide-gray-200 bg-white\">", "</tbody>", |w| {
                            w.block("{filtered.map((item) => (", "))}", |w| {
                                w.block("<tr key={item.id}>", "</tr>", |w| {
                                    for f in &fields {
                                        w.line(format!(
                                            "<td className=\"{TD_CLASS}\">{{formatValue({})}}</td>",
                                            ts_access("item", &f.name)
                                        ));
                                    }
                                    w.block(format!("<td className=\"{TD_CLASS} font-medium\">"), "</td>", |w| {
                                        w.line(format!(
                                            "<Link to={{`{path}/${{item.id}}`}} className=\"mr-4 text-gray-600 hover:text-gray-900\">View</Link>"
                                        ));
                                        w.line("<button onClick={() => openForm(item)} className=\"mr-4 text-blue-600 hover:text-blue-900\">Edit</button>");
                                        w.line("<button");
                                        w.indent()
                                            .line("onClick={() => handleDelete(item.id)}")
                                            .line("disabled={deleteMutation.isPending}")
                                            .line("className=\"text-red-600 hover:text-red-900\"")
                                            .dedent();
                                        w.line(">");
                                        w.indent().line("Delete").dedent();
                                        w.line("</button>");
                                    });
                                });
                            });
                        });
                    });
                    w.line("{filtered.length === 0 && <p className=\"py-12 text-center text-gray-500\">No records</p>}");
                });
                w.blank();
                w.block("{showForm && (", ")}", |w| {
                    w.line(format!("<{ty}Form"));
                    w.indent();
                    w.line("item={editing}");
                    w.line("onClose={closeForm}");
                    w.block("onSaved={() => {", "}}", |w| {
                        w.line("closeForm()");
                        w.line("queryClient.invalidateQueries({ queryKey: QUERY_KEY })");
                    });
                    w.dedent();
                    w.line("/>");
                });
            });
        });
    });
    w.blank();

    // inline create/edit form
    w.line(format!("function {ty}Form({{"));
    w.indent().line("item,").line("onClose,").line("onSaved,").dedent();
    w.block(
        format!("}}: {{ item: {ty} | null; onClose: () => void; onSaved: () => void }}) {{"),
        "}",
        |w| {
            w.line(format!(
                "const [formData, setFormData] = useState<Partial<{ty}Input>>(item ?? {{}})"
            ));
            w.block("const saveMutation = useMutation({", "})", |w| {
                w.line(format!("mutationFn: (data: Partial<{ty}Input>) =>"));
                w.indent()
                    .line(format!(
                        "item ? {svc}.update(item.id, data) : {svc}.create(data as {ty}Input),"
                    ))
                    .dedent();
                w.line("onSuccess: onSaved,");
            });
            w.blank();
            w.block("const handleSubmit = (e: FormEvent) => {", "}", |w| {
                w.line("e.preventDefault()");
                w.line("saveMutation.mutate(formData)");
            });
            w.blank();
            w.block("return (", ")", |w| {
                w.block(
                    "<div className=\"fixed inset-0 z-50 flex items-center justify-center bg-gray-600/50\">",
                    "</div>",
                    |w| {
                        w.block("<div className=\"w-full max-w-md rounded-lg bg-white p-6\">", "</div>", |w| {
                            w.line(format!(
                                "<h2 className=\"mb-4 text-lg font-semibold\">{{item ? 'Edit' : 'New'}} {}</h2>",
                                jsx_text(label)
                            ));
                            w.block("<form onSubmit={handleSubmit} className=\"space-y-4\">", "</form>", |w| {
                                for f in &fields {
                                    form_control(w, f);
                                }
                                w.block("<div className=\"flex space-x-3\">", "</div>", |w| {
                                    w.line("<button");
                                    w.indent()
                                        .line("type=\"submit\"")
                                        .line("disabled={saveMutation.isPending}")
                                        .line("className=\"flex-1 rounded-md bg-blue-600 px-4 py-2 text-white hover:bg-blue-700 disabled:opacity-50\"")
                                        .dedent();
                                    w.line(">");
                                    w.indent().line("{saveMutation.isPending ? 'Saving...' : 'Save'}").dedent();
                                    w.line("</button>");
                                    w.line("<button");
                                    w.indent()
                                        .line("type=\"button\"")
                                        .line("onClick={onClose}")
                                        .line("className=\"flex-1 rounded-md bg-gray-300 px-4 py-2 text-gray-700 hover:bg-gray-400\"")
                                        .dedent();
                                    w.line(">");
                                    w.indent().line("Cancel").dedent();
                                    w.line("</button>");
                                });
                            });
                        });
                    },
                );
            });
        },
    );
    w.blank();

    // detail view
    w.block(format!("export function {ty}Detail() {{"), "}", |w| {
        w.line("const { id = '' } = useParams()");
        w.block("const { data: item, isLoading, error } = useQuery({", "})", |w| {
            w.line("queryKey: [...QUERY_KEY, id],");
            w.line(format!("queryFn: () => {svc}.get(id),"));
        });
        w.blank();
        w.line("if (isLoading) return <div className=\"py-8 text-center\">Loading...</div>");
        w.line(format!(
            "if (error || !item) return <div className=\"py-8 text-center text-red-600\">{}</div>",
            jsx_text(&format!("{label} not found"))
        ));
        w.blank();
        w.block("return (", ")", |w| {
            w.block("<div className=\"space-y-6\">", "</div>", |w| {
                w.line(format!(
                    "<Link to=\"{path}\" className=\"text-sm text-blue-600 hover:text-blue-900\">{}</Link>",
                    jsx_text(&format!("Back to {label}"))
                ));
                w.line(format!(
                    "<h1 className=\"text-2xl font-bold text-gray-900\">{}</h1>",
                    jsx_text(&page_title(schema, entity, PageKind::Detail))
                ));
                w.block("<dl className=\"divide-y divide-gray-200 bg-white shadow sm:rounded-md\">", "</dl>", |w| {
                    for f in &entity.columns {
                        w.block("<div className=\"grid grid-cols-3 gap-4 px-6 py-4\">", "</div>", |w| {
                            w.line(format!(
                                "<dt className=\"text-sm font-medium text-gray-500\">{}</dt>",
                                jsx_text(&naming::title_case(&f.name))
                            ));
                            w.line(format!(
                                "<dd className=\"col-span-2 text-sm text-gray-900\">{{formatValue({})}}</dd>",
                                ts_access("item", &f.name)
                            ));
                        });
                    }
                });
            });
        });
    });

    Ok(w.finish())
}

/// One form control, chosen by field type.
fn form_control(w: &mut CodeWriter, field: &Field) {
    let label = jsx_text(&naming::title_case(&field.name));
    let key = ts_key(&field.name);
    let value = ts_access("formData", &field.name);
    let required = if field.required { " required" } else { "" };

    if field.ty == FieldType::Boolean {
        w.block("<label className=\"flex items-center gap-2 text-sm font-medium text-gray-700\">", "</label>", |w| {
            w.line("<input");
            w.indent()
                .line("type=\"checkbox\"")
                .line(format!("checked={{Boolean({value})}}"))
                .line(format!(
                    "onChange={{(e) => setFormData({{ ...formData, {key}: e.target.checked }})}}"
                ))
                .dedent();
            w.line("/>");
            w.line(&label);
        });
        return;
    }

    w.block("<div>", "</div>", |w| {
        w.line(format!("<label className=\"{LABEL_CLASS}\">{label}</label>"));
        match field.ty {
            FieldType::Textarea => {
                w.line(format!("<textarea{required}"));
                w.indent()
                    .line("rows={4}")
                    .line(format!("value={{{value} ?? ''}}"))
                    .line(format!(
                        "onChange={{(e) => setFormData({{ ...formData, {key}: e.target.value }})}}"
                    ))
                    .line(format!("className=\"{INPUT_CLASS}\""))
                    .dedent();
                w.line("/>");
            }
            FieldType::Date => {
                w.line(format!("<input{required}"));
                w.indent()
                    .line("type=\"datetime-local\"")
                    .line(format!("value={{toDateTimeInput({value})}}"))
                    .line(format!(
                        "onChange={{(e) => setFormData({{ ...formData, {key}: fromDateTimeInput(e.target.value) }})}}"
                    ))
                    .line(format!("className=\"{INPUT_CLASS}\""))
                    .dedent();
                w.line("/>");
            }
            FieldType::Number => {
                w.line(format!("<input{required}"));
                w.indent()
                    .line("type=\"number\"")
                    .line("step=\"any\"")
                    .line(format!("value={{{value} ?? ''}}"))
                    .line(format!(
                        "onChange={{(e) => setFormData({{ ...formData, {key}: e.target.value === '' ? undefined : parseFloat(e.target.value) }})}}"
                    ))
                    .line(format!("className=\"{INPUT_CLASS}\""))
                    .dedent();
                w.line("/>");
            }
            _ => {
                let input_type = if field.ty == FieldType::Email { "email" } else { "text" };
                w.line(format!("<input{required}"));
                w.indent()
                    .line(format!("type=\"{input_type}\""))
                    .line(format!("value={{{value} ?? ''}}"))
                    .line(format!(
                        "onChange={{(e) => setFormData({{ ...formData, {key}: e.target.value }})}}"
                    ))
                    .line(format!("className=\"{INPUT_CLASS}\""))
                    .dedent();
                w.line("/>");
            }
        }
    });
}
