use super::legend::LegendRow;
use crate::model::Palette;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LegendPanelProps {
    pub palette: Palette,
    pub layer_name: Option<String>,
}

#[function_component]
pub fn LegendPanel(props: &LegendPanelProps) -> Html {
    html! {<div style="position:absolute; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:170px;">
        <div style="font-weight:600; margin-bottom:4px;">{"Land cover"}</div>
        { if let Some(name) = &props.layer_name { html!{<div style="font-size:11px; color:#8b949e; margin-bottom:6px;">{name}</div>} } else { html!{} } }
        { for props.palette.entries.iter().map(|e| html!{ <LegendRow value={e.value} color={e.color.clone()} label={e.label.clone()} /> }) }
    </div>}
}
