use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LegendRowProps {
    pub value: u8,
    pub color: AttrValue,
    pub label: AttrValue,
}

#[function_component(LegendRow)]
pub fn legend_row(props: &LegendRowProps) -> Html {
    html! { <div style="display:flex; align-items:center; gap:8px; margin:3px 0;"> <span style={format!("display:inline-block; width:12px; height:12px; background:{}; border:1px solid #30363d; border-radius:2px;", props.color)}></span> <span style="width:14px; color:#8b949e; font-variant-numeric:tabular-nums;">{ props.value }</span> <span>{ props.label.clone() }</span> </div> }
}
