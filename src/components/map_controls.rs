use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct MapControlsProps {
    pub zoom: f64,
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_recenter: Callback<()>,
}

#[function_component(MapControls)]
pub fn map_controls(props: &MapControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let rc = {
        let cb = props.on_recenter.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:6px; align-items:center;">
        <button onclick={zo}> {"-"} </button>
        <span style="min-width:48px; text-align:center; font-variant-numeric:tabular-nums;">{ format!("z{:.1}", props.zoom) }</span>
        <button onclick={zi}> {"+"} </button>
        <span style="width:8px;"></span>
        <button onclick={rc}> {"Recenter"} </button>
    </div>}
}
