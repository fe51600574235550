//! 仪表盘页面
//!
//! 单页表单：侧栏录入患者指标，调用 `/api/v1` 接口完成预测、导出、清空和历史查看。

use axum::response::Html;

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Asthma Risk Predictor</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f4f6fb;
            color: #333;
            display: flex;
            min-height: 100vh;
        }

        .sidebar {
            width: 320px;
            background: white;
            padding: 20px;
            box-shadow: 2px 0 10px rgba(0,0,0,0.08);
            overflow-y: auto;
        }

        .sidebar h2 { color: #667eea; margin-bottom: 15px; font-size: 1.2rem; }

        .field { margin-bottom: 12px; }
        .field label { display: block; font-size: 0.85rem; margin-bottom: 4px; }
        .field input[type=text], .field textarea, .field select { width: 100%; padding: 6px; }
        .field input[type=range] { width: 80%; }
        .field output { width: 18%; display: inline-block; text-align: right; font-size: 0.85rem; }

        .sidebar button {
            width: 100%;
            margin-top: 8px;
            padding: 8px;
            border: none;
            border-radius: 5px;
            background: #667eea;
            color: white;
            cursor: pointer;
        }
        .sidebar button.danger { background: #d9534f; }

        .main { flex: 1; padding: 30px; }
        .main h1 { text-align: center; margin-bottom: 25px; }

        .card {
            background: white;
            border-radius: 10px;
            padding: 25px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.06);
            margin-bottom: 20px;
        }
        .card p { margin: 6px 0; }
        .message { color: #2e7d32; }
        .error { color: #c62828; }

        table { width: 100%; border-collapse: collapse; font-size: 0.85rem; }
        th, td { border-bottom: 1px solid #eee; padding: 6px; text-align: left; }
        th { background: #f8f9fa; }
    </style>
</head>
<body>
    <form class="sidebar" id="patient-form">
        <h2>Enter Patient Details</h2>
        <div class="field"><label>Patient Name</label><input type="text" name="patient_name" value="John Doe"></div>
        <div class="field"><label>Doctor's Notes</label><textarea name="doctor_note" rows="3" placeholder="Write any observations or suggestions"></textarea></div>

        <div class="field"><label>Age</label><input type="range" name="age" min="0" max="100" step="1" value="30"><output></output></div>
        <div class="field"><label>BMI</label><input type="range" name="bmi" min="10" max="50" step="0.1" value="22.5"><output></output></div>
        <div class="field"><label>Physical Activity (0-10)</label><input type="range" name="physical_activity" min="0" max="10" step="1" value="5"><output></output></div>
        <div class="field"><label>Diet Quality (0-10)</label><input type="range" name="diet_quality" min="0" max="10" step="1" value="5"><output></output></div>
        <div class="field"><label>Sleep Quality (0-10)</label><input type="range" name="sleep_quality" min="0" max="10" step="1" value="6"><output></output></div>
        <div class="field"><label>Pollution Exposure (0-10)</label><input type="range" name="pollution_exposure" min="0" max="10" step="1" value="5"><output></output></div>
        <div class="field"><label>Pollen Exposure (0-10)</label><input type="range" name="pollen_exposure" min="0" max="10" step="1" value="5"><output></output></div>
        <div class="field"><label>Dust Exposure (0-10)</label><input type="range" name="dust_exposure" min="0" max="10" step="1" value="5"><output></output></div>
        <div class="field"><label>Lung Function FEV1</label><input type="range" name="fev1" min="0.5" max="5.0" step="0.01" value="3.2"><output></output></div>
        <div class="field"><label>Lung Function FVC</label><input type="range" name="fvc" min="0.5" max="6.0" step="0.01" value="4.0"><output></output></div>
        <div class="field"><label>Symptom Score (0-6)</label><input type="range" name="symptom_score" min="0" max="6" step="1" value="2"><output></output></div>

        <div class="field"><label>Smoking Status</label><select name="smoking"><option>0</option><option>1</option></select></div>
        <div class="field"><label>Pet Allergy</label><select name="pet_allergy"><option>0</option><option>1</option></select></div>
        <div class="field"><label>Family History of Asthma</label><select name="family_history_asthma"><option>0</option><option>1</option></select></div>
        <div class="field"><label>History of Allergies</label><select name="history_of_allergies"><option>0</option><option>1</option></select></div>

        <div class="field"><label><input type="checkbox" id="show-history"> Show All Patient Predictions</label></div>
        <button type="button" id="export">Export to Excel</button>
        <a id="download" href="/api/v1/records/export">Download workbook</a>
        <button type="button" id="clear" class="danger">Clear All Records</button>
    </form>

    <div class="main">
        <h1>Asthma Risk Prediction Dashboard</h1>
        <div class="card"><button type="button" id="predict">Predict Asthma Risk</button></div>
        <div class="card" id="result" hidden></div>
        <div class="card" id="status" hidden></div>
        <div class="card" id="history" hidden></div>
    </div>

    <script>
        const form = document.getElementById('patient-form');
        const numeric = new Set(['bmi', 'fev1', 'fvc']);

        form.querySelectorAll('input[type=range]').forEach((input) => {
            const out = input.nextElementSibling;
            out.textContent = input.value;
            input.addEventListener('input', () => { out.textContent = input.value; });
        });

        function payload() {
            const data = {};
            for (const [key, value] of new FormData(form).entries()) {
                if (key === 'patient_name' || key === 'doctor_note') {
                    data[key] = value;
                } else {
                    data[key] = numeric.has(key) ? parseFloat(value) : parseInt(value, 10);
                }
            }
            return data;
        }

        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = String(text);
            return div.innerHTML;
        }

        function showStatus(message, isError) {
            const el = document.getElementById('status');
            el.hidden = false;
            el.innerHTML = `<p class="${isError ? 'error' : 'message'}">${escapeHtml(message)}</p>`;
        }

        async function call(method, url, body) {
            const response = await fetch(url, {
                method,
                headers: body ? { 'Content-Type': 'application/json' } : {},
                body: body ? JSON.stringify(body) : undefined,
            });
            const json = await response.json().catch(() => ({ message: response.statusText }));
            if (!response.ok) throw new Error(json.message || response.statusText);
            return json;
        }

        async function refreshHistory() {
            const el = document.getElementById('history');
            if (!document.getElementById('show-history').checked) { el.hidden = true; return; }
            el.hidden = false;
            const data = await call('GET', '/api/v1/records');
            if (data.total === 0) { el.innerHTML = '<p>No records yet.</p>'; return; }
            const cols = ['patient_name', 'prediction', 'risk_percent', 'risk_level', 'age_group', 'top_risks', 'action', 'doctor_note'];
            const head = ['PatientName', 'Prediction', 'RiskPercent', 'RiskLevel', 'AgeGroup', 'TopRisks', 'Action', 'DoctorNote'];
            el.innerHTML = '<h3>Patient History</h3><table><tr>' + head.map((h) => `<th>${h}</th>`).join('') + '</tr>' +
                data.records.map((r) => '<tr>' + cols.map((c) => `<td>${escapeHtml(r[c])}</td>`).join('') + '</tr>').join('') +
                '</table>';
        }

        document.getElementById('predict').addEventListener('click', async () => {
            try {
                const data = await call('POST', '/api/v1/assessments', payload());
                const r = data.record;
                const el = document.getElementById('result');
                el.hidden = false;
                el.innerHTML = `<h2>Result for: ${escapeHtml(r.patient_name)}</h2>
                    <p><strong>Prediction:</strong> ${escapeHtml(r.prediction)}</p>
                    <p><strong>Risk Probability:</strong> ${r.risk_percent}%</p>
                    <p><strong>Risk Level:</strong> ${escapeHtml(r.risk_level)}</p>
                    <p><strong>Age Group:</strong> ${escapeHtml(r.age_group)}</p>
                    <p><strong>Top Risk Factors:</strong> ${escapeHtml(r.top_risks)}</p>
                    <p><strong>Suggested Action:</strong> ${escapeHtml(r.action)}</p>` +
                    (r.doctor_note ? `<p><strong>Doctor's Note:</strong> ${escapeHtml(r.doctor_note)}</p>` : '');
                await refreshHistory();
            } catch (e) { showStatus(e.message, true); }
        });

        document.getElementById('export').addEventListener('click', async () => {
            try {
                const data = await call('POST', '/api/v1/records/export');
                showStatus(`Exported ${data.rows} records to ${data.path}`, false);
            } catch (e) { showStatus(e.message, true); }
        });

        document.getElementById('clear').addEventListener('click', async () => {
            try {
                await call('DELETE', '/api/v1/records');
                showStatus('All records cleared.', false);
                await refreshHistory();
            } catch (e) { showStatus(e.message, true); }
        });

        document.getElementById('show-history').addEventListener('change', () => {
            refreshHistory().catch((e) => showStatus(e.message, true));
        });
    </script>
</body>
</html>
"#;
