use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::state::explorer::PanelWidgets;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlPanelProps {
    pub regions: Vec<&'static str>,
    pub selected: Option<&'static str>,
    pub widgets: PanelWidgets,
    pub diagnostic: Option<String>,
    pub on_select_region: Callback<String>,
    pub on_download: Callback<()>,
    pub on_clear: Callback<()>,
    pub on_dismiss: Callback<()>,
}

const BUTTON_STYLE: &str =
    "height:36px; width:140px; padding:3px; font-size:12px; text-align:center; margin:0;";

#[function_component]
pub fn ControlPanel(props: &ControlPanelProps) -> Html {
    let select_cb = {
        let cb = props.on_select_region.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            cb.emit(select.value());
        })
    };
    let download_cb = {
        let cb = props.on_download.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let clear_cb = {
        let cb = props.on_clear.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let dismiss_cb = {
        let cb = props.on_dismiss.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let w = &props.widgets;

    html! {<div style="position:absolute; top:12px; left:12px; width:300px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; flex-direction:column; gap:8px; font-size:13px;">
        <label>{"1. Choose a State:"}</label>
        <select onchange={select_cb}>
            { for props.regions.iter().map(|name| html!{ <option value={*name} selected={props.selected == Some(*name)}>{ *name }</option> }) }
        </select>
        <label>{"2. Draw a shape on the map (polygon or rectangle)."}</label>
        <div style="display:flex; flex-direction:row; margin:2px 0;">
            { if w.download_button_visible { html!{ <button style={BUTTON_STYLE} onclick={download_cb}>{"Download Drawn Area"}</button> } } else { html!{} } }
            <button style={format!("{} margin:0 0 0 5px;", BUTTON_STYLE)} onclick={clear_cb}>{"Clear Shape"}</button>
        </div>
        <label>{"3. The JPG preview/link will appear below."}</label>
        <div style="margin:8px 0;">
            { if let Some(src) = &w.thumbnail_url { html!{ <img src={src.clone()} alt="Land cover preview" style="width:100%; height:auto; margin:0 0 8px 0; display:block;" /> } } else { html!{} } }
            { match &w.link.url {
                Some(url) => html!{ <a href={url.clone()} target="_blank" rel="noopener" style="color:#58a6ff;">{ w.link.label.clone() }</a> },
                None => html!{ <span>{ w.link.label.clone() }</span> },
            } }
        </div>
        { if let Some(msg) = &props.diagnostic { html!{
            <div style="display:flex; gap:6px; align-items:flex-start; color:#f85149; font-size:12px;">
                <span style="flex:1;">{ msg.clone() }</span>
                <button onclick={dismiss_cb} style="padding:0 6px;">{"×"}</button>
            </div>
        } } else { html!{} } }
    </div>}
}
