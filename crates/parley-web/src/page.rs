//! The embedded single-page chat UI.
//!
//! Self-contained HTML/CSS/JS served at `/`. The page drives the REST API:
//! `/api/state` on load, `/api/settings` when a control changes,
//! `/api/chat` on submit, `/api/reset` for a new chat. Submit is disabled
//! while a call is in flight, mirroring the server's busy guard.

use axum::response::Html;

/// GET / — Serve the chat page.
pub async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

const CHAT_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>parley</title>
<style>
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;background:#1e1e1e;color:#cccccc;height:100vh;display:flex;flex-direction:column}
.header{padding:14px 20px;background:#252526;border-bottom:1px solid #3c3c3c;display:flex;align-items:center;gap:12px}
.header h1{font-size:16px;font-weight:600;color:#4ec9b0}
.settings{padding:10px 20px;background:#252526;border-bottom:1px solid #3c3c3c;display:flex;gap:14px;align-items:center;flex-wrap:wrap;font-size:13px}
.settings label{color:#888}
.settings select{padding:6px 10px;border:1px solid #3c3c3c;border-radius:6px;background:#313131;color:#cccccc;font-size:13px;outline:none}
.settings select:focus{border-color:#4ec9b0}
.settings input[type=range]{accent-color:#4ec9b0;vertical-align:middle}
.settings button{padding:6px 14px;background:#313131;color:#cccccc;border:1px solid #3c3c3c;border-radius:6px;cursor:pointer}
.settings button:hover{border-color:#4ec9b0}
.messages{flex:1;overflow-y:auto;padding:20px;display:flex;flex-direction:column;gap:10px}
.msg{max-width:80%;padding:10px 14px;border-radius:12px;font-size:14px;line-height:1.5;word-wrap:break-word;white-space:pre-wrap}
.msg.user{align-self:flex-end;background:#2a2d2e;border:1px solid #4ec9b033}
.msg.bot{align-self:flex-start;background:#252526;border:1px solid #3c3c3c}
.msg.error{align-self:center;color:#f44;font-size:13px}
.busy{align-self:flex-start;color:#888;font-size:13px;padding:4px 14px;display:none}
.busy::after{content:'...';animation:dots 1.2s infinite}
@keyframes dots{0%,20%{content:'.'}40%{content:'..'}60%,100%{content:'...'}}
.input-bar{padding:16px 20px;background:#252526;border-top:1px solid #3c3c3c;display:flex;gap:8px}
.input-bar input{flex:1;padding:10px 14px;border:1px solid #3c3c3c;border-radius:8px;background:#313131;color:#cccccc;font-size:14px;outline:none}
.input-bar input:focus{border-color:#4ec9b0}
.input-bar button{padding:10px 20px;background:#4ec9b0;color:#1e1e1e;border:none;border-radius:8px;font-weight:600;cursor:pointer;white-space:nowrap}
.input-bar button:disabled{opacity:.4;cursor:not-allowed}
</style>
</head>
<body>
<div class="header"><h1>parley</h1></div>
<div class="settings">
  <label for="model">Model</label>
  <select id="model">
    <option>gpt-3.5-turbo</option>
    <option>text-davinci-003</option>
    <option>text-davinci-002</option>
    <option>code-davinci-002</option>
  </select>
  <label for="persona">Persona</label>
  <select id="persona">
    <option>general-assistant</option>
    <option>philosophical</option>
    <option>witty</option>
  </select>
  <label for="temp">Temperature</label>
  <input type="range" id="temp" min="0" max="1" step="0.01" value="0.5">
  <span id="tempVal">0.5</span>
  <button id="resetBtn">New Chat</button>
</div>
<div class="messages" id="messages"></div>
<div class="busy" id="busy">Generating response</div>
<div class="input-bar">
  <input id="chatInput" placeholder="Enter your message..." autofocus>
  <button id="sendBtn">Submit</button>
</div>
<script>
const msgs=document.getElementById("messages");
const inp=document.getElementById("chatInput");
const sendBtn=document.getElementById("sendBtn");
const busy=document.getElementById("busy");
const model=document.getElementById("model");
const persona=document.getElementById("persona");
const temp=document.getElementById("temp");
const tempVal=document.getElementById("tempVal");

function addMsg(cls,text){
  const d=document.createElement("div");
  d.className="msg "+cls;
  d.textContent=text;
  msgs.appendChild(d);
  msgs.scrollTop=msgs.scrollHeight;
}

function render(state){
  msgs.innerHTML="";
  for(const ex of state.exchanges){
    addMsg("user",ex.input);
    addMsg("bot",ex.output);
  }
  if(state.last_error)addMsg("error","An error occurred: "+state.last_error);
  model.value=state.model;
  persona.value=state.persona;
  temp.value=state.temperature;
  tempVal.textContent=Number(state.temperature).toFixed(2);
}

async function loadState(){
  const res=await fetch("/api/state");
  if(res.ok)render(await res.json());
}

async function pushSettings(){
  tempVal.textContent=Number(temp.value).toFixed(2);
  const body={model:model.value,persona:persona.value,temperature:Number(temp.value)};
  const res=await fetch("/api/settings",{
    method:"POST",
    headers:{"Content-Type":"application/json"},
    body:JSON.stringify(body)
  });
  if(!res.ok)addMsg("error","Settings rejected.");
}

function setBusy(on){
  sendBtn.disabled=on;
  busy.style.display=on?"block":"none";
}

async function send(){
  const message=inp.value.trim();
  if(!message||sendBtn.disabled)return;
  setBusy(true);
  addMsg("user",message);
  try{
    const res=await fetch("/api/chat",{
      method:"POST",
      headers:{"Content-Type":"application/json"},
      body:JSON.stringify({message})
    });
    if(res.ok){
      const data=await res.json();
      addMsg("bot",data.reply);
      inp.value="";
    }else{
      const data=await res.json().catch(()=>({error:"request failed"}));
      addMsg("error","An error occurred: "+data.error);
    }
  }catch(e){
    addMsg("error","An error occurred: "+e.message);
  }finally{
    setBusy(false);
    inp.focus();
  }
}

async function resetChat(){
  await fetch("/api/reset",{method:"POST"});
  inp.value="";
  await loadState();
}

sendBtn.onclick=send;
inp.addEventListener("keydown",e=>{if(e.key==="Enter")send()});
model.onchange=pushSettings;
persona.onchange=pushSettings;
temp.onchange=pushSettings;
temp.oninput=()=>{tempVal.textContent=Number(temp.value).toFixed(2)};
document.getElementById("resetBtn").onclick=resetChat;
loadState();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use parley::config::MODEL_CATALOG;
    use parley::persona::PERSONAS;

    #[test]
    fn page_lists_every_catalog_model() {
        for model in MODEL_CATALOG {
            assert!(
                CHAT_PAGE.contains(model),
                "dropdown is missing model {model}"
            );
        }
    }

    #[test]
    fn page_lists_every_persona() {
        for persona in PERSONAS {
            assert!(
                CHAT_PAGE.contains(persona.name()),
                "dropdown is missing persona {persona}"
            );
        }
    }

    #[test]
    fn page_slider_covers_the_temperature_domain() {
        assert!(CHAT_PAGE.contains(r#"min="0" max="1""#));
        assert!(CHAT_PAGE.contains(r#"value="0.5""#));
    }
}
