use std::rc::Rc;

use super::{
    control_panel::ControlPanel, draw_toolbar::DrawToolbar, legend_panel::LegendPanel,
    map_canvas::MapCanvas, map_controls::MapControls,
};
use crate::config::{AppConfig, REGION_STORAGE_KEY, read_storage, write_storage};
use crate::imagery::ImageryService;
use crate::model::{ShapeKind, find_region, region_names};
use crate::state::{ExplorerAction, ExplorerState};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    pub config: Rc<AppConfig>,
}

fn initial_state(config: Rc<AppConfig>) -> ExplorerState {
    let service: Rc<dyn ImageryService> = Rc::new(config.render_proxy());
    log::info!("rendering through {}", config.endpoint);
    ExplorerState::new(config, service)
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let state = {
        let config = props.config.clone();
        use_reducer(move || initial_state(config))
    };

    // Select the last used region, or the configured one, on startup
    {
        let state = state.clone();
        use_effect_with((), move |_| {
            let stored = read_storage(REGION_STORAGE_KEY).filter(|name| find_region(name).is_some());
            let name = stored.unwrap_or_else(|| state.config.initial_region.clone());
            state.dispatch(ExplorerAction::SelectRegion(name));
            || ()
        });
    }
    // Persist region changes
    {
        let region = state.region.map(|r| r.name);
        use_effect_with(region, move |region| {
            if let Some(name) = region {
                write_storage(REGION_STORAGE_KEY, name);
            }
            || ()
        });
    }

    let dispatch = |action: ExplorerAction| {
        let state = state.clone();
        Callback::from(move |()| state.dispatch(action.clone()))
    };
    let select_region = {
        let state = state.clone();
        Callback::from(move |name: String| state.dispatch(ExplorerAction::SelectRegion(name)))
    };
    let select_mode = {
        let state = state.clone();
        Callback::from(move |mode: Option<ShapeKind>| state.dispatch(ExplorerAction::SetDrawMode(mode)))
    };

    let widgets = state.widgets();
    let layer_name = state.map.layers.first().map(|l| l.name.clone());

    html! {
        <div id="root" style="position:relative; width:100vw; height:100vh; overflow:hidden;">
            <MapCanvas state={state.clone()} />
            <ControlPanel
                regions={region_names().collect::<Vec<_>>()}
                selected={state.region.map(|r| r.name)}
                widgets={widgets}
                diagnostic={state.diagnostic.clone()}
                on_select_region={select_region}
                on_download={dispatch(ExplorerAction::Download)}
                on_clear={dispatch(ExplorerAction::Clear)}
                on_dismiss={dispatch(ExplorerAction::DismissDiagnostic)}
            />
            <DrawToolbar modes={state.drawing.modes().to_vec()} active={state.drawing.active_mode()} on_select={select_mode} />
            <MapControls
                zoom={state.map.zoom}
                on_zoom_in={dispatch(ExplorerAction::ZoomBy(1.0))}
                on_zoom_out={dispatch(ExplorerAction::ZoomBy(-1.0))}
                on_recenter={dispatch(ExplorerAction::Recenter)}
            />
            <LegendPanel palette={state.config.vis.palette.clone()} layer_name={layer_name} />
        </div>
    }
}
