use yew::prelude::*;

use crate::model::ShapeKind;

#[derive(Properties, PartialEq, Clone)]
pub struct DrawToolbarProps {
    pub modes: Vec<ShapeKind>,
    pub active: Option<ShapeKind>,
    pub on_select: Callback<Option<ShapeKind>>,
}

#[function_component]
pub fn DrawToolbar(props: &DrawToolbarProps) -> Html {
    let button = |mode: Option<ShapeKind>, label: &'static str| {
        let cb = props.on_select.clone();
        let selected = props.active == mode;
        let style = if selected {
            "background:#1f6feb; border:1px solid #388bfd; color:#fff;"
        } else {
            ""
        };
        html! { <button style={style} onclick={Callback::from(move |_| cb.emit(mode))}>{ label }</button> }
    };
    html! {<div style="position:absolute; top:12px; left:50%; transform:translateX(-50%); background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:6px; display:flex; gap:6px;">
        { button(None, "Pan") }
        { for props.modes.iter().map(|m| button(Some(*m), m.label())) }
    </div>}
}
