use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};
use yew::prelude::*;

use crate::model::{LonLat, ShapeKind};
use crate::state::{ExplorerAction, ExplorerState, MapView, Sketch};

/// Clicks within this many pixels of the first vertex close a polygon.
const CLOSE_RADIUS_PX: f64 = 8.0;

#[derive(Properties, PartialEq, Clone)]
pub struct MapCanvasProps {
    pub state: UseReducerHandle<ExplorerState>,
}

#[derive(Debug, Default)]
struct PanDrag {
    active: bool,
    last_x: f64,
    last_y: f64,
}

fn canvas_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
    (canvas.width() as f64, canvas.height() as f64)
}

/// Pointer position relative to the canvas, valid for window-level events too.
fn canvas_point(canvas: &HtmlCanvasElement, e: &web_sys::MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (e.client_x() as f64 - rect.left(), e.client_y() as f64 - rect.top())
}

fn trace_path(ctx: &CanvasRenderingContext2d, view: &MapView, size: (f64, f64), pts: &[LonLat], close: bool) {
    ctx.begin_path();
    for (i, p) in pts.iter().enumerate() {
        let (x, y) = view.project(*p, size);
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    if close {
        ctx.close_path();
    }
}

#[function_component(MapCanvas)]
pub fn map_canvas(props: &MapCanvasProps) -> Html {
    let canvas_ref = use_node_ref();
    let sketch = use_mut_ref(Sketch::default);
    let drag = use_mut_ref(PanDrag::default);
    let images = use_mut_ref(HashMap::<String, HtmlImageElement>::new);
    let onload_cbs = use_mut_ref(Vec::<Closure<dyn FnMut()>>::new);
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let state_ref = use_mut_ref(|| props.state.clone());

    // Refresh the handle and redraw whenever the explorer state changes
    {
        let state_ref = state_ref.clone();
        let current_handle = props.state.clone();
        let draw_ref_local = draw_ref.clone();
        let sketch = sketch.clone();
        let version = props.state.version;
        use_effect_with(version, move |_| {
            if state_ref.borrow().clear_count != current_handle.clear_count {
                sketch.borrow_mut().cancel();
            }
            *state_ref.borrow_mut() = current_handle;
            if let Some(f) = &*draw_ref_local.borrow() {
                f();
            }
            || ()
        });
    }

    {
        let canvas_ref = canvas_ref.clone();
        let draw_ref_setup = draw_ref.clone();

        use_effect_with((), move |_| {
            let window = web_sys::window().expect("no global `window` exists");
            let canvas: HtmlCanvasElement = canvas_ref
                .cast::<HtmlCanvasElement>()
                .expect("canvas_ref not attached to a canvas element");

            let fit_canvas = {
                let canvas = canvas.clone();
                let window = window.clone();
                move || {
                    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
                    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
                    canvas.set_width(width.max(0.0) as u32);
                    canvas.set_height(height.max(0.0) as u32);
                }
            };
            fit_canvas();

            let draw_closure: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let state_ref = state_ref.clone();
                let sketch = sketch.clone();
                let images = images.clone();
                let onload_cbs = onload_cbs.clone();
                let draw_ref = draw_ref_setup.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    let ctx = match canvas.get_context("2d").ok().flatten() {
                        Some(c) => match c.dyn_into::<CanvasRenderingContext2d>() {
                            Ok(ctx) => ctx,
                            Err(_) => return,
                        },
                        None => return,
                    };
                    let size = canvas_size(&canvas);
                    let handle = state_ref.borrow().clone();
                    let view = &handle.map;

                    ctx.set_fill_style_str("#0e1116");
                    ctx.fill_rect(0.0, 0.0, size.0, size.1);

                    // Composite layers, stretched over their bounds
                    for layer in &view.layers {
                        let (x0, y0) = view.project(LonLat::new(layer.bounds.west, layer.bounds.north), size);
                        let (x1, y1) = view.project(LonLat::new(layer.bounds.east, layer.bounds.south), size);
                        let mut cache = images.borrow_mut();
                        if !cache.contains_key(&layer.image_url) {
                            match HtmlImageElement::new() {
                                Ok(img) => {
                                    let draw_ref = draw_ref.clone();
                                    let url = layer.image_url.clone();
                                    let onload = Closure::wrap(Box::new(move || {
                                        log::debug!("layer image loaded: {}", url);
                                        if let Some(f) = &*draw_ref.borrow() {
                                            f();
                                        }
                                    }) as Box<dyn FnMut()>);
                                    img.set_onload(Some(onload.as_ref().unchecked_ref()));
                                    img.set_src(&layer.image_url);
                                    onload_cbs.borrow_mut().push(onload);
                                    cache.insert(layer.image_url.clone(), img);
                                }
                                Err(_) => log::error!("could not create image element for {}", layer.name),
                            }
                        }
                        if let Some(img) = cache.get(&layer.image_url) {
                            if img.complete() && img.natural_width() > 0 {
                                ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x0, y0, x1 - x0, y1 - y0).ok();
                            } else {
                                ctx.set_fill_style_str("#161b22");
                                ctx.fill_rect(x0, y0, x1 - x0, y1 - y0);
                            }
                        }
                        ctx.set_stroke_style_str("#2f3641");
                        ctx.set_line_width(1.0);
                        ctx.stroke_rect(x0, y0, x1 - x0, y1 - y0);
                        ctx.set_fill_style_str("#8b949e");
                        ctx.set_font("12px sans-serif");
                        ctx.fill_text(&layer.name, x0 + 4.0, y0 - 6.0).ok();
                    }

                    // Drawn shapes; the newest one is the one that gets exported
                    let layers = handle.drawing.layers();
                    for (i, drawn) in layers.iter().enumerate() {
                        let newest = i + 1 == layers.len();
                        trace_path(&ctx, view, size, &drawn.vertices(), true);
                        ctx.set_fill_style_str(if newest { "rgba(240,136,62,0.18)" } else { "rgba(88,166,255,0.12)" });
                        ctx.fill();
                        ctx.set_stroke_style_str(if newest { "#f0883e" } else { "#58a6ff" });
                        ctx.set_line_width(2.0);
                        ctx.stroke();
                    }

                    // Sketch in progress
                    let sk = sketch.borrow();
                    let outline = sk.outline();
                    if !outline.is_empty() {
                        let dash = js_dash(&[6.0, 4.0]);
                        ctx.set_line_dash(&dash).ok();
                        trace_path(&ctx, view, size, &outline, sk.kind == Some(ShapeKind::Rectangle));
                        ctx.set_stroke_style_str("#f0883e");
                        ctx.set_line_width(1.5);
                        ctx.stroke();
                        ctx.set_line_dash(&js_dash(&[])).ok();
                        ctx.set_fill_style_str("#f0883e");
                        for p in &sk.vertices {
                            let (x, y) = view.project(*p, size);
                            ctx.fill_rect(x - 3.0, y - 3.0, 6.0, 6.0);
                        }
                    }
                })
            };
            *draw_ref_setup.borrow_mut() = Some(draw_closure.clone());
            draw_closure();

            // Wheel zoom around the pointer
            let wheel_cb = {
                let canvas = canvas.clone();
                let state_ref = state_ref.clone();
                Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                    e.prevent_default();
                    let anchor = canvas_point(&canvas, &e);
                    let delta = (-e.delta_y() * 0.002).clamp(-1.0, 1.0);
                    let handle = state_ref.borrow().clone();
                    handle.dispatch(ExplorerAction::ZoomAt { delta, anchor, size: canvas_size(&canvas) });
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .ok();

            let mousedown_cb = {
                let canvas = canvas.clone();
                let state_ref = state_ref.clone();
                let sketch = sketch.clone();
                let drag = drag.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let handle = state_ref.borrow().clone();
                    let mode = handle.drawing.active_mode();
                    match (e.button(), mode) {
                        (0, Some(mode)) => {
                            let size = canvas_size(&canvas);
                            let (px, py) = canvas_point(&canvas, &e);
                            let at = handle.map.unproject(px, py, size);
                            let mut sk = sketch.borrow_mut();
                            let near_first = sk.vertices.first().is_some_and(|first| {
                                let (fx, fy) = handle.map.project(*first, size);
                                (fx - px).hypot(fy - py) <= CLOSE_RADIUS_PX
                            });
                            if let Some(geometry) = sk.press(mode, at, near_first) {
                                drop(sk);
                                handle.dispatch(ExplorerAction::ShapeCompleted(geometry));
                            }
                        }
                        _ => {
                            let mut d = drag.borrow_mut();
                            d.active = true;
                            d.last_x = e.client_x() as f64;
                            d.last_y = e.client_y() as f64;
                        }
                    }
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
                .ok();

            let mousemove_cb = {
                let canvas = canvas.clone();
                let state_ref = state_ref.clone();
                let sketch = sketch.clone();
                let drag = drag.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let handle = state_ref.borrow().clone();
                    let mut d = drag.borrow_mut();
                    if d.active {
                        let x = e.client_x() as f64;
                        let y = e.client_y() as f64;
                        let (dx, dy) = (x - d.last_x, y - d.last_y);
                        d.last_x = x;
                        d.last_y = y;
                        drop(d);
                        handle.dispatch(ExplorerAction::Pan { dx, dy });
                        return;
                    }
                    drop(d);
                    let mut sk = sketch.borrow_mut();
                    if sk.is_active() {
                        let (px, py) = canvas_point(&canvas, &e);
                        sk.move_to(handle.map.unproject(px, py, canvas_size(&canvas)));
                        drop(sk);
                        if let Some(f) = &*draw_ref.borrow() {
                            f();
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
                .ok();

            let mouseup_cb = {
                let canvas = canvas.clone();
                let state_ref = state_ref.clone();
                let sketch = sketch.clone();
                let drag = drag.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    drag.borrow_mut().active = false;
                    let handle = state_ref.borrow().clone();
                    let (px, py) = canvas_point(&canvas, &e);
                    let at = handle.map.unproject(px, py, canvas_size(&canvas));
                    let finished = sketch.borrow_mut().release(at);
                    if let Some(geometry) = finished {
                        handle.dispatch(ExplorerAction::ShapeCompleted(geometry));
                    }
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .ok();

            let dblclick_cb = {
                let state_ref = state_ref.clone();
                let sketch = sketch.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    e.prevent_default();
                    let finished = sketch.borrow_mut().finish();
                    if let Some(geometry) = finished {
                        let handle = state_ref.borrow().clone();
                        handle.dispatch(ExplorerAction::ShapeCompleted(geometry));
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("dblclick", dblclick_cb.as_ref().unchecked_ref())
                .ok();

            let keydown_cb = {
                let sketch = sketch.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                    if e.key() == "Escape" {
                        sketch.borrow_mut().cancel();
                        if let Some(f) = &*draw_ref.borrow() {
                            f();
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();

            let contextmenu_cb = {
                Closure::wrap(Box::new(move |e: web_sys::Event| {
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref())
                .ok();

            let resize_cb = {
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move || {
                    fit_canvas();
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut()>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();

            // Cleanup
            let window_clone = window.clone();
            move || {
                let _ = canvas.remove_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback("dblclick", dblclick_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref());
                let _ = window_clone.remove_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref());
                let _ = window_clone.remove_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref());
                let _ = window_clone.remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
                *draw_ref_setup.borrow_mut() = None;
                onload_cbs.borrow_mut().clear();
            }
        });
    }

    let cursor = if props.state.drawing.active_mode().is_some() { "crosshair" } else { "grab" };
    html! {
        <canvas ref={canvas_ref} id="map-canvas" style={format!("display:block; width:100%; height:100%; cursor:{};", cursor)}></canvas>
    }
}

fn js_dash(segments: &[f64]) -> js_sys::Array {
    segments.iter().map(|s| JsValue::from_f64(*s)).collect()
}
