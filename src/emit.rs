//! Animation-document emitter: builds an SVG-shaped XML tree from a
//! finished `Scene`/`Timeline` and serializes it (spec.md §4.5, §6).
//!
//! The `Node` tree and its constructors mirror the hand-rolled
//! `XML`/`SVG`/`Circle`/`Rect`/`Animate`/`Set` class hierarchy in
//! `examples/original_source/generate.py`.

use crate::scene::Scene;
use crate::shapes::Shape;
use crate::timeline::Timeline;

pub const DEFAULT_WIDTH: f64 = 500.0;
pub const DEFAULT_HEIGHT: f64 = 500.0;

/// A generic element: a name, insertion-ordered attributes, children, and
/// optional text content.
#[derive(Clone, Debug)]
pub struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
    text: Option<String>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[allow(dead_code)]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn write_indented(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(v);
            out.push('"');
        }
        if self.children.is_empty() && self.text.is_none() {
            out.push_str(" />\n");
            return;
        }
        out.push_str(">\n");
        if let Some(text) = &self.text {
            out.push_str(&"  ".repeat(depth + 1));
            out.push_str(text);
            out.push('\n');
        }
        for child in &self.children {
            child.write_indented(out, depth + 1);
        }
        out.push_str(&indent);
        out.push_str("</");
        out.push_str(&self.name);
        out.push_str(">\n");
    }

    pub fn to_string_pretty(&self) -> String {
        let mut out = String::new();
        self.write_indented(&mut out, 0);
        out
    }
}

fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v}")
    }
}

pub fn svg_root(width: f64, height: f64) -> Node {
    Node::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr("viewbox", format!("0 0 {} {}", fmt_num(width), fmt_num(height)))
}

fn rect_node(id: &str, x: f64, y: f64, w: f64, h: f64, fill: &str) -> Node {
    Node::new("rect")
        .attr("id", id)
        .attr("x", fmt_num(x))
        .attr("y", fmt_num(y))
        .attr("width", fmt_num(w))
        .attr("height", fmt_num(h))
        .attr("fill", format!("#{fill}"))
        .attr("opacity", "0")
}

fn circle_node(id: &str, cx: f64, cy: f64, r: f64, fill: &str) -> Node {
    Node::new("circle")
        .attr("id", id)
        .attr("cx", fmt_num(cx))
        .attr("cy", fmt_num(cy))
        .attr("r", fmt_num(r))
        .attr("fill", format!("#{fill}"))
        .attr("opacity", "0")
}

fn group(id: &str) -> Node {
    Node::new("g").attr("id", id)
}

fn animate(attribute: &str, from: f64, to: f64, dur: f64, begin: &str) -> Node {
    Node::new("animate")
        .attr("attributeName", attribute)
        .attr("from", fmt_num(from))
        .attr("to", fmt_num(to))
        .attr("dur", format!("{}s", fmt_num(dur)))
        .attr("begin", begin)
        .attr("fill", "freeze")
}

fn set(attribute: &str, value: &str, begin: &str) -> Node {
    Node::new("set")
        .attr("attributeName", attribute)
        .attr("to", value)
        .attr("begin", begin)
        .attr("fill", "freeze")
}

/// The two SVG attribute names a shape's position maps to, per spec.md §6
/// ("x, y for rectangles; cx, cy for circles").
fn position_attrs(shape: &Shape) -> (&'static str, &'static str) {
    match shape {
        Shape::Rect(_) => ("x", "y"),
        Shape::Circle(_) => ("cx", "cy"),
    }
}

/// Reconstruct the position an object was created at, by subtracting every
/// committed motion delta from its final position — the interpreter only
/// keeps the final `x, y` on `Object`, so the emitter walks the timeline
/// backwards to recover the per-segment starting coordinates it needs for
/// `<animate from="..." to="...">`.
fn creation_position(obj_index: usize, timeline: &Timeline, final_pos: (f64, f64)) -> (f64, f64) {
    let mut total = (0.0, 0.0);
    for seg in &timeline.segments {
        if let Some(Some((dx, dy))) = seg.moving.get(obj_index) {
            total.0 += dx;
            total.1 += dy;
        }
    }
    (final_pos.0 - total.0, final_pos.1 - total.1)
}

/// Build the full animation document for a finished interpreter run
/// (spec.md §6 "Output document").
pub fn emit_document(scene: &Scene, timeline: &Timeline) -> Node {
    let mut root = svg_root(DEFAULT_WIDTH, DEFAULT_HEIGHT);

    let mut objects_group = group("objects");
    for obj in &scene.objects {
        let node = match &obj.shape {
            Shape::Rect(r) => rect_node(&obj.name, obj.x, obj.y, r.width, r.height, &r.fill),
            Shape::Circle(c) => circle_node(&obj.name, obj.x, obj.y, c.r, &c.fill),
        };
        objects_group = objects_group.child(node);
    }
    root = root.child(objects_group);

    let mut running: Vec<(f64, f64)> = scene
        .objects
        .iter()
        .enumerate()
        .map(|(i, o)| creation_position(i, timeline, (o.x, o.y)))
        .collect();
    let mut prev_visibility: Vec<bool> = vec![false; scene.objects.len()];

    let mut timeline_group = group("timeline");
    let mut prev_tick_id: Option<String> = None;

    for (seg_idx, seg) in timeline.segments.iter().enumerate() {
        if seg.is_boot() {
            continue;
        }
        let tick_id = format!("seg{seg_idx}_tick");
        let begin = match &prev_tick_id {
            Some(prev) => format!("{prev}.end"),
            None => "0s".to_string(),
        };
        let mut seg_group = group(&format!("seg{seg_idx}")).child(
            animate("x", 0.0, 0.0, seg.duration, &begin).attr("id", tick_id.clone()),
        );

        for (obj_idx, obj) in scene.objects.iter().enumerate() {
            if seg.visibility[obj_idx] != prev_visibility[obj_idx] {
                let value = if seg.visibility[obj_idx] { "1" } else { "0" };
                seg_group = seg_group.child(set(
                    "opacity",
                    value,
                    &format!("{tick_id}.begin"),
                ));
            }

            if let Some((dx, dy)) = seg.moving[obj_idx] {
                let (axis_x, axis_y) = position_attrs(&obj.shape);
                let (start_x, start_y) = running[obj_idx];
                if dx != 0.0 {
                    seg_group = seg_group.child(animate(
                        axis_x,
                        start_x,
                        start_x + dx,
                        seg.duration,
                        &format!("{tick_id}.begin"),
                    ));
                }
                if dy != 0.0 {
                    seg_group = seg_group.child(animate(
                        axis_y,
                        start_y,
                        start_y + dy,
                        seg.duration,
                        &format!("{tick_id}.begin"),
                    ));
                }
                running[obj_idx] = (start_x + dx, start_y + dy);
            }
        }

        prev_visibility = seg.visibility.clone();
        timeline_group = timeline_group.child(seg_group);
        prev_tick_id = Some(tick_id);
    }
    root = root.child(timeline_group);

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;
    use crate::interpreter::Interpreter;

    #[test]
    fn emits_viewbox_and_objects_group() {
        let program = parse(
            r#"A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1]; duration 1 {}"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        interp.run(&program).unwrap();
        let doc = emit_document(&interp.scene, &interp.timeline).to_string_pretty();
        assert!(doc.contains("viewbox=\"0 0 500 500\""));
        assert!(doc.contains("id=\"objects\""));
        assert!(doc.contains("id=\"timeline\""));
    }

    #[test]
    fn motion_with_zero_delta_component_is_not_emitted() {
        let program = parse(
            r#"A = Array(1, Rect); A[1] := Rect(0, 0, 10, 10); appear A[1];
               duration 1 { move A[1] by 5, 0 }"#,
        )
        .unwrap();
        let mut interp = Interpreter::new();
        interp.run(&program).unwrap();
        let doc = emit_document(&interp.scene, &interp.timeline).to_string_pretty();
        assert!(doc.contains("attributeName=\"x\""));
        assert!(!doc.contains("attributeName=\"y\""));
    }
}
